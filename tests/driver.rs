//! Driver hosting: periodic ticks, shutdown handling and subscriber fan-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use taskweave::{
    Driver, Event, EventKind, Scheduler, SchedulerConfig, Subscribe, TaskError,
};
use tokio_util::sync::CancellationToken;

fn config() -> SchedulerConfig {
    SchedulerConfig {
        tick: Duration::from_millis(5),
        ..SchedulerConfig::default()
    }
}

#[derive(Default)]
struct Counter {
    called: AtomicUsize,
    done: AtomicUsize,
    shutdown: AtomicUsize,
}

#[async_trait]
impl Subscribe for Counter {
    async fn on_event(&self, ev: &Event) {
        let slot = match ev.kind {
            EventKind::TaskCalled => &self.called,
            EventKind::TaskDone => &self.done,
            EventKind::ShutdownRequested => &self.shutdown,
            _ => return,
        };
        slot.fetch_add(1, Ordering::SeqCst);
    }

    fn name(&self) -> &'static str {
        "counter"
    }
}

#[tokio::test(start_paused = true)]
async fn driver_ticks_until_completion() {
    let scheduler: Scheduler<u32> = Scheduler::new(config());
    let handle = scheduler.handle();

    let mut leaf = handle.task().on_call(|ctx| {
        let _ = ctx.done(11);
    });
    let reply = leaf.completion();
    handle.emit(leaf).unwrap();

    let token = CancellationToken::new();
    let driver = Driver::new(scheduler).spawn(token.clone());

    assert_eq!(reply.await, Ok(Some(11)));
    token.cancel();

    let scheduler = driver.await.unwrap();
    assert!(scheduler.ticks() >= 2);
    assert_eq!(scheduler.stats().done, 1);
}

#[tokio::test(start_paused = true)]
async fn driver_sweeps_timeouts() {
    let scheduler: Scheduler<u32> = Scheduler::new(config());
    let handle = scheduler.handle();

    let mut leaf = handle.task().with_timeout_ms(50);
    let outcome = leaf.completion();
    handle.emit(leaf).unwrap();

    let token = CancellationToken::new();
    let driver = Driver::new(scheduler).spawn(token.clone());

    match outcome.await {
        Err(TaskError::Timeout { elapsed }) => assert!(elapsed >= Duration::from_millis(50)),
        other => panic!("expected timeout, got {other:?}"),
    }
    token.cancel();
    assert_eq!(driver.await.unwrap().stats().timed_out, 1);
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_in_flight_tasks() {
    let scheduler: Scheduler<u32> = Scheduler::new(config());
    let handle = scheduler.handle();

    let mut pending = handle.task();
    let outcome = pending.completion();
    handle.emit(pending).unwrap();

    let token = CancellationToken::new();
    let driver = Driver::new(scheduler).spawn(token.clone());
    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();

    let scheduler = driver.await.unwrap();
    assert_eq!(outcome.await, Err(TaskError::Canceled));
    assert_eq!(scheduler.registered_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_can_leave_tasks_registered() {
    let cfg = SchedulerConfig {
        cancel_on_shutdown: false,
        ..config()
    };
    let scheduler: Scheduler<u32> = Scheduler::new(cfg);
    let handle = scheduler.handle();
    let leaf = handle.task();
    let id = leaf.id();
    handle.emit(leaf).unwrap();

    let token = CancellationToken::new();
    let driver = Driver::new(scheduler).spawn(token.clone());
    tokio::time::sleep(Duration::from_millis(20)).await;
    token.cancel();

    let mut scheduler = driver.await.unwrap();
    assert!(scheduler.is_waiting(id));
    assert!(scheduler.trigger_done(id, None));
}

#[tokio::test]
async fn subscribers_see_lifecycle_and_shutdown() {
    let scheduler: Scheduler<u32> = Scheduler::builder(config()).with_events().build();
    let handle = scheduler.handle();

    let finish = |ctx: taskweave::CallContext<u32>| {
        let _ = ctx.finish();
    };
    let a = handle.task().on_call(finish);
    let b = handle.task().on_call(finish);
    let mut serial = handle.serial(vec![a, b]);
    let outcome = serial.completion();
    handle.emit(serial).unwrap();

    let counter = Arc::new(Counter::default());
    let token = CancellationToken::new();
    let driver = Driver::new(scheduler)
        .with_subscribers(vec![counter.clone() as Arc<dyn Subscribe>])
        .spawn(token.clone());

    assert_eq!(outcome.await, Ok(None));
    token.cancel();
    driver.await.unwrap();

    assert_eq!(counter.called.load(Ordering::SeqCst), 3);
    assert_eq!(counter.done.load(Ordering::SeqCst), 3);
    assert_eq!(counter.shutdown.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn driver_without_bus_ignores_subscribers() {
    let scheduler: Scheduler<u32> = Scheduler::new(config());
    let counter = Arc::new(Counter::default());
    let token = CancellationToken::new();
    token.cancel();

    let scheduler = Driver::new(scheduler)
        .with_subscribers(vec![counter.clone() as Arc<dyn Subscribe>])
        .run(token)
        .await;

    assert!(scheduler.bus().is_none());
    assert_eq!(counter.shutdown.load(Ordering::SeqCst), 0);
}
