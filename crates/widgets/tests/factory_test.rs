use std::sync::Arc;
use std::time::Duration;

use signage_config::WeatherConfig;
use signage_core::{Lifecycle, Widget};
use signage_domain::{PeriodicScheduler, WidgetState};
use signage_testing_utils::{
    wait_for_state, CatalogRecordBuilder, MockMessagingClient, MockRenderHost, MockScheduler,
    MockWeatherApi, WeatherResponseBuilder,
};
use signage_widgets::{WidgetFactory, WidgetKind, WidgetServices};

struct Fixture {
    factory: WidgetFactory,
    host: Arc<MockRenderHost>,
    scheduler: Arc<MockScheduler>,
    api: Arc<MockWeatherApi>,
    messaging: Arc<MockMessagingClient>,
}

fn fixture() -> Fixture {
    let host = Arc::new(MockRenderHost::new());
    let scheduler = Arc::new(MockScheduler::new());
    let api = Arc::new(MockWeatherApi::with_response(
        WeatherResponseBuilder::new()
            .with_current(18.0, "cloudy")
            .with_days(1_704_110_400, 5)
            .with_hours(1_704_110_400, 6)
            .build(),
    ));
    let messaging = Arc::new(MockMessagingClient::new());

    let factory = WidgetFactory::new(WidgetServices {
        scheduler: scheduler.clone(),
        render_host: host.clone(),
        weather_api: api.clone(),
        messaging: Some(messaging.clone()),
        weather: WeatherConfig::default(),
    });

    Fixture {
        factory,
        host,
        scheduler,
        api,
        messaging,
    }
}

async fn wait_until_stopped(widget: &Arc<dyn Widget>) -> bool {
    wait_for_state(
        || widget.core().state(),
        WidgetState::Stopped,
        Duration::from_secs(1),
    )
    .await
}

#[tokio::test]
async fn test_factory_builds_and_initializes_weather() {
    let fixture = fixture();
    let record = CatalogRecordBuilder::weather(12, "10001")
        .with_name("Lobby Weather")
        .with_duration(15)
        .build();

    let widget = fixture.factory.create_widget(&record, 2, 7);
    assert_eq!(widget.core().profile().widget_type.as_deref(), Some("weather"));
    assert_eq!(widget.core().profile().duration, 15);
    assert_eq!(widget.core().profile().zone_id, 2);
    assert!(widget.scheduler().is_some());

    assert!(wait_until_stopped(&widget).await);
    let specs = fixture.host.acquired_specs();
    assert_eq!(specs.len(), 1);
    assert_eq!(specs[0].element_id, "widget_12");
    assert_eq!(specs[0].data_name.as_deref(), Some("Lobby Weather"));
    assert_eq!(fixture.messaging.subscriptions(), vec!["10001".to_string()]);
}

#[tokio::test]
async fn test_unknown_type_falls_back_to_generic() {
    let fixture = fixture();
    let record = CatalogRecordBuilder::new("lottery", 40).build();

    let widget = fixture.factory.create_widget(&record, 1, 1);
    assert!(widget.scheduler().is_none());
    assert_eq!(widget.core().profile().widget_type.as_deref(), Some("lottery"));
    assert!(wait_until_stopped(&widget).await);
}

#[tokio::test]
async fn test_missing_type_builds_generic() {
    let fixture = fixture();
    let record = CatalogRecordBuilder::untyped(41).build();

    let widget = fixture.factory.create_widget(&record, 1, 1);
    assert!(widget.scheduler().is_none());
    assert!(widget.core().profile().widget_type.is_none());
    assert!(wait_until_stopped(&widget).await);
}

#[tokio::test]
async fn test_initialization_failure_is_contained() {
    let fixture = fixture();
    fixture.host.fail_next_acquire();
    let record = CatalogRecordBuilder::weather(13, "10001").build();

    let widget = fixture.factory.create_widget(&record, 1, 1);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(widget.core().state(), WidgetState::Created);
}

#[tokio::test]
async fn test_record_without_priority_keeps_kind_default() {
    let fixture = fixture();
    let cases = [
        (CatalogRecordBuilder::weather(30, "10001").build(), WidgetKind::Weather),
        (CatalogRecordBuilder::new("lottery", 31).build(), WidgetKind::Generic),
        (CatalogRecordBuilder::untyped(32).build(), WidgetKind::Generic),
    ];

    for (record, kind) in cases {
        assert!(record.priority.is_none());
        let widget = fixture.factory.create_widget(&record, 2, 5);
        assert_eq!(
            widget.core().profile().priority,
            kind.default_profile(2, 5).priority
        );
    }

    let record = CatalogRecordBuilder::weather(33, "10001").with_priority(4).build();
    let widget = fixture.factory.create_widget(&record, 2, 5);
    assert_eq!(widget.core().profile().priority, 4);
}

#[tokio::test]
async fn test_create_widgets_preserves_order() {
    let fixture = fixture();
    let records = vec![
        CatalogRecordBuilder::weather(1, "10001").build(),
        CatalogRecordBuilder::new("clock", 2).build(),
        CatalogRecordBuilder::weather(3, "94105").build(),
    ];

    let widgets = fixture.factory.create_widgets(&records, 1, 1);
    let ids: Vec<Option<i64>> = widgets.iter().map(|w| w.core().id()).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
}

#[tokio::test]
async fn test_weather_widget_full_rotation() {
    let fixture = fixture();
    let record = CatalogRecordBuilder::weather(12, "10001").build();
    let widget = fixture.factory.create_widget(&record, 1, 1);
    assert!(wait_until_stopped(&widget).await);

    let slots = widget.query_slots(3, 25);
    assert_eq!(slots.len(), 2);
    let current = &slots[0];

    widget.get_ready_for_display(current).await.unwrap();
    assert_eq!(fixture.api.call_count(), 1);
    let surface = fixture.host.surface("widget_12").unwrap();
    assert_eq!(surface.renders().len(), 1);

    widget.play(current).await.unwrap();
    assert!(fixture.scheduler.contains("get_weather_12"));

    // fresh data: the timer firing does not refetch
    assert!(fixture.scheduler.fire("get_weather_12").await);
    assert_eq!(fixture.api.call_count(), 1);

    let fade = widget.before_fade_out(current, Some(&slots[1])).await.unwrap();
    assert!(fade.cancel_fade);

    widget.pause(current).await.unwrap();
    assert!(fixture.scheduler.is_paused("get_weather_12"));
    assert!(!fixture.scheduler.fire("get_weather_12").await);

    widget.play(current).await.unwrap();
    assert_eq!(fixture.scheduler.create_count("get_weather_12"), 1);

    widget.stop().await.unwrap();
    assert!(!fixture.scheduler.contains("get_weather_12"));
    assert_eq!(surface.clear_count(), 1);
    assert_eq!(widget.core().state(), WidgetState::Stopped);
}

#[tokio::test]
async fn test_push_update_triggers_refresh_while_playing() {
    let fixture = fixture();
    let record = CatalogRecordBuilder::weather(12, "10001").build();
    let widget = fixture.factory.create_widget(&record, 1, 1);
    assert!(wait_until_stopped(&widget).await);

    fixture.messaging.push_update("10001");

    let api = fixture.api.clone();
    let refreshed = signage_testing_utils::TestEnv::wait_until(
        || api.call_count() == 1,
        Duration::from_secs(1),
    )
    .await;
    assert!(refreshed);
    assert_eq!(widget.core().state(), WidgetState::Stopped);
}
