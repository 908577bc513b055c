//! Integration tests for the emitter: normalization, matching, pipelines,
//! middlewares, chained subscriptions, scoping and error containment.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::sleep;

use pipebus::{Context, Emitter, EmitterError, Flow, HandlerFn, HandlerRef, Subscription, WorkError};

/// Handler that only counts invocations and forwards data unchanged.
fn counting<T: Clone + Send + 'static>(calls: &Arc<AtomicUsize>) -> HandlerRef<T> {
    let calls = calls.clone();
    HandlerFn::arc(move |ctx: Context<T>| {
        let calls = calls.clone();
        async move {
            calls.fetch_add(1, Ordering::SeqCst);
            ctx.next()
        }
    })
}

#[tokio::test]
async fn context_carries_data_topic_and_matched_patterns() {
    let bus: Emitter<&'static str> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let check = |calls: &Arc<AtomicUsize>| -> HandlerRef<&'static str> {
        let calls = calls.clone();
        HandlerFn::arc(move |ctx: Context<&'static str>| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                assert_eq!(ctx.data, "test");
                assert_eq!(ctx.pub_event.as_ref(), "hello/se/world");
                let subs: Vec<&str> = ctx.sub_events.iter().map(|s| s.as_ref()).collect();
                assert_eq!(subs, vec!["hello/se/world", "hello/*/world"]);
                ctx.next()
            }
        })
    };

    bus.initialize(vec![check(&calls)]).unwrap();
    bus.subscribe("/hello/se/world", vec![check(&calls)])
        .subscribe("/hello/*/world", vec![check(&calls)]);

    bus.publish("/hello/se/world", "test").await;

    // one middleware run + one handler run per matched subscription
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn publish_and_subscribe_work_without_initialization() {
    let bus: Emitter<&'static str> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    bus.subscribe("foo/bar", vec![counting(&calls)]);
    bus.publish("/foo/bar/", "hello").await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn leading_trailing_and_empty_segments_are_ignored() {
    let bus: Emitter<u8> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    bus.subscribe("foo//bar", vec![counting(&calls)]);
    bus.publish("/foo/bar/", 0).await;
    bus.publish("foo/bar", 0).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn exact_match_delivers_exactly_once() {
    let bus: Emitter<u8> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    bus.subscribe("a/b", vec![counting(&calls)]);
    bus.publish("a/b", 0).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn single_wildcard_consumes_exactly_one_segment() {
    let bus: Emitter<u8> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    bus.subscribe("a/*/c", vec![counting(&calls)]);
    bus.publish("a/b/c", 0).await;
    bus.publish("a/b/x/c", 0).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn tail_wildcard_matches_zero_or_more_segments() {
    let bus: Emitter<u8> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    bus.subscribe("a/**", vec![counting(&calls)]);
    bus.publish("a/b/c/d", 0).await;
    bus.publish("a", 0).await;
    bus.publish("b", 0).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn piped_handlers_thread_data_in_order() {
    let bus: Emitter<i32> = Emitter::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    let stage = |tag: i32, order: &Arc<Mutex<Vec<i32>>>| -> HandlerRef<i32> {
        let order = order.clone();
        HandlerFn::arc(move |ctx: Context<i32>| {
            let order = order.clone();
            async move {
                // suspend so sequencing is observable, not accidental
                sleep(Duration::from_millis(5)).await;
                order.lock().push(tag);
                assert_eq!(ctx.data, tag);
                Ok(Flow::Next(ctx.data + 1))
            }
        })
    };

    bus.subscribe(
        "/foo/bar",
        vec![stage(0, &order), stage(1, &order), stage(2, &order)],
    );
    bus.publish("/foo/bar", 0).await;

    assert_eq!(*order.lock(), vec![0, 1, 2]);
}

#[tokio::test]
async fn end_short_circuits_the_rest_of_the_pipeline() {
    let bus: Emitter<i32> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicUsize::new(0));

    let c1 = calls.clone();
    let c2 = calls.clone();
    let c3 = calls.clone();
    bus.subscribe(
        "/hello/world",
        vec![
            HandlerFn::arc(move |ctx: Context<i32>| {
                let c = c1.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(ctx.data, 0);
                    sleep(Duration::from_millis(5)).await;
                    Ok(Flow::Next(1))
                }
            }),
            HandlerFn::arc(move |ctx: Context<i32>| {
                let c = c2.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(ctx.data, 1);
                    Ok(Flow::End(2))
                }
            }),
            HandlerFn::arc(move |_ctx: Context<i32>| {
                let c = c3.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(Flow::Next(3))
                }
            }),
        ],
    );

    // A sibling subscription observes the final value of its own pipeline,
    // not the ended one's; `end` is pipeline-local.
    let f = finished.clone();
    bus.subscribe(
        "/hello/world",
        vec![HandlerFn::arc(move |ctx: Context<i32>| {
            let f = f.clone();
            async move {
                f.fetch_add(1, Ordering::SeqCst);
                assert_eq!(ctx.data, 0);
                ctx.next()
            }
        })],
    );

    bus.publish("/hello/world", 0).await;

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn middleware_end_blocks_subscription_handlers() {
    let bus: Emitter<i32> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let c1 = calls.clone();
    let c2 = calls.clone();
    bus.initialize(vec![
        HandlerFn::arc(move |ctx: Context<i32>| {
            let c = c1.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                assert_eq!(ctx.data, 0);
                Ok(Flow::End(2))
            }
        }),
        HandlerFn::arc(move |_ctx: Context<i32>| {
            let c = c2.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(Flow::Next(3))
            }
        }),
    ])
    .unwrap();

    bus.subscribe("test", vec![counting(&calls)]);
    bus.publish("test", 0).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn middlewares_run_in_order_before_handlers() {
    let bus: Emitter<i32> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let mw = |expect: i32, add: i32, calls: &Arc<AtomicUsize>| -> HandlerRef<i32> {
        let calls = calls.clone();
        HandlerFn::arc(move |ctx: Context<i32>| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                assert_eq!(ctx.data, expect);
                assert_eq!(ctx.pub_event.as_ref(), "foo/bar");
                sleep(Duration::from_millis(2)).await;
                Ok(Flow::Next(ctx.data + add))
            }
        })
    };

    bus.initialize(vec![mw(0, 10, &calls), mw(10, 5, &calls), mw(15, 100, &calls)])
        .unwrap();

    let c = calls.clone();
    bus.subscribe(
        "/foo/bar",
        vec![HandlerFn::arc(move |ctx: Context<i32>| {
            let c = c.clone();
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                assert_eq!(ctx.data, 115);
                ctx.next()
            }
        })],
    );

    bus.publish("/foo/bar", 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn empty_handler_list_runs_the_middleware_chain_alone() {
    let bus: Emitter<u8> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    bus.initialize(vec![counting(&calls)]).unwrap();
    bus.subscribe("bare/topic", vec![]);

    bus.publish("bare/topic", 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // the record still counts and still matches on later publishes
    assert_eq!(bus.subscription_count(), 1);
    bus.publish("bare/topic", 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn initialize_twice_fails_and_reset_rearms() {
    let bus: Emitter<u8> = Emitter::new();

    bus.initialize(vec![]).unwrap();
    let err = bus.initialize(vec![]).unwrap_err();
    assert!(matches!(err, EmitterError::AlreadyInitialized));

    bus.reset();
    bus.initialize(vec![]).unwrap();
}

#[tokio::test]
async fn reset_clears_subscriptions() {
    let bus: Emitter<u8> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    bus.subscribe("a", vec![counting(&calls)]);
    bus.subscribe("b", vec![counting(&calls)]);
    assert_eq!(bus.subscription_count(), 2);

    bus.reset();
    assert_eq!(bus.subscription_count(), 0);

    bus.publish("a", 0).await;
    bus.publish("b", 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn chained_subscriptions_unsubscribe_together() {
    let bus: Emitter<&'static str> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let sub = bus
        .subscribe("/another/world", vec![counting(&calls)])
        .subscribe("/hello/world", vec![counting(&calls)])
        .subscribe("/cat/*/rat", vec![counting(&calls)]);

    bus.publish("another/world", "ping").await;
    bus.publish("/hello/world", "hello-world").await;
    bus.publish("/cat/bat/rat", "glob").await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);

    sub.unsubscribe();

    bus.publish("another/world", "ping").await;
    bus.publish("/hello/world", "hello-world").await;
    bus.publish("/cat/bat/rat", "glob").await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn unsubscribe_is_idempotent() {
    let bus: Emitter<u8> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let sub = bus.subscribe("/hello/se/world", vec![counting(&calls)]);
    sub.unsubscribe();
    sub.unsubscribe();

    bus.publish("/hello/se/world", 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn subscriptions_added_after_a_publish_receive_later_publishes() {
    let bus: Emitter<&'static str> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    bus.subscribe("/hello/*/world", vec![counting(&calls)]);
    bus.publish("/hello/se/world", "test").await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    bus.subscribe("/hello/se/world", vec![counting(&calls)]);
    bus.publish("/hello/se/world", "test").await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn sibling_pipelines_do_not_observe_each_others_data() {
    let bus: Emitter<i32> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    // First subscription transforms its data through a suspension point.
    let c1 = calls.clone();
    let c2 = calls.clone();
    bus.subscribe(
        "/foo/bar",
        vec![
            HandlerFn::arc(move |ctx: Context<i32>| {
                let c = c1.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(ctx.data, 0);
                    sleep(Duration::from_millis(10)).await;
                    Ok(Flow::Next(ctx.data + 10))
                }
            }),
            HandlerFn::arc(move |ctx: Context<i32>| {
                let c = c2.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    assert_eq!(ctx.data, 10);
                    ctx.next()
                }
            }),
        ],
    );

    // Second subscription must still see the published seed.
    let c3 = calls.clone();
    bus.subscribe(
        "/foo/bar",
        vec![HandlerFn::arc(move |ctx: Context<i32>| {
            let c = c3.clone();
            async move {
                sleep(Duration::from_millis(20)).await;
                c.fetch_add(1, Ordering::SeqCst);
                assert_eq!(ctx.data, 0);
                ctx.next()
            }
        })],
    );

    bus.publish("/foo/bar", 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn publish_awaits_every_async_pipeline() {
    let bus: Emitter<&'static str> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let slow = |calls: &Arc<AtomicUsize>| -> HandlerRef<&'static str> {
        let calls = calls.clone();
        HandlerFn::arc(move |ctx: Context<&'static str>| {
            let calls = calls.clone();
            async move {
                sleep(Duration::from_millis(10)).await;
                calls.fetch_add(1, Ordering::SeqCst);
                assert_eq!(ctx.data, "test");
                ctx.next()
            }
        })
    };

    bus.initialize(vec![slow(&calls)]).unwrap();
    bus.subscribe("/hello/se/world", vec![slow(&calls), slow(&calls)]);
    bus.subscribe("/hello/*/world", vec![slow(&calls), slow(&calls)]);

    bus.publish("/hello/se/world", "test").await;

    // No settling delay: everything must have finished when publish resolves.
    assert_eq!(calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn a_failing_pipeline_does_not_affect_its_siblings() {
    let bus: Emitter<&'static str> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let c1 = calls.clone();
    bus.subscribe(
        "foo/bar",
        vec![
            counting(&calls),
            HandlerFn::arc(move |_ctx: Context<&'static str>| {
                let c = c1.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(WorkError::fail("failed"))
                }
            }),
            // must never run: the pipeline halted one stage earlier
            HandlerFn::arc(|_ctx: Context<&'static str>| async move {
                panic!("stage after a failure must not run");
            }),
        ],
    );
    bus.subscribe("foo/bar", vec![counting(&calls), counting(&calls)]);

    bus.publish("foo/bar", "test").await;
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn a_panicking_handler_is_contained() {
    let bus: Emitter<u8> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    bus.subscribe(
        "boom",
        vec![HandlerFn::arc(|_ctx: Context<u8>| async move {
            panic!("handler exploded");
        })],
    );
    bus.subscribe("boom", vec![counting(&calls)]);

    bus.publish("boom", 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unsubscribing_mid_dispatch_does_not_affect_the_snapshot() {
    let bus: Emitter<u8> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let victim: Arc<Mutex<Option<Subscription<u8>>>> = Arc::new(Mutex::new(None));

    let v = victim.clone();
    bus.subscribe(
        "topic",
        vec![HandlerFn::arc(move |ctx: Context<u8>| {
            let v = v.clone();
            async move {
                if let Some(sub) = v.lock().take() {
                    sub.unsubscribe();
                }
                sleep(Duration::from_millis(5)).await;
                ctx.next()
            }
        })],
    );
    let sub = bus.subscribe("topic", vec![counting(&calls)]);
    *victim.lock() = Some(sub);

    // The victim was matched before its group was removed, so it still runs.
    bus.publish("topic", 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Next publish no longer matches it.
    bus.publish("topic", 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn publishes_may_overlap() {
    let bus: Emitter<u8> = Emitter::new();
    let in_flight = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));

    let f = in_flight.clone();
    let p = peak.clone();
    bus.subscribe(
        "slow/*",
        vec![HandlerFn::arc(move |ctx: Context<u8>| {
            let f = f.clone();
            let p = p.clone();
            async move {
                let now = f.fetch_add(1, Ordering::SeqCst) + 1;
                p.fetch_max(now, Ordering::SeqCst);
                sleep(Duration::from_millis(20)).await;
                f.fetch_sub(1, Ordering::SeqCst);
                ctx.next()
            }
        })],
    );

    let first = bus.publish("slow/a", 0);
    let second = bus.publish("slow/b", 0);
    futures::future::join(first, second).await;

    assert_eq!(peak.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn scoped_topics_are_isolated_from_unscoped_ones() {
    let bus: Emitter<&'static str> = Emitter::new();
    let scoped_calls = Arc::new(AtomicUsize::new(0));

    bus.subscribe(
        "/hello/world",
        vec![HandlerFn::arc(|_ctx: Context<&'static str>| async move {
            panic!("unscoped subscription must not see scoped publishes");
        })],
    );

    let scope = bus.get_scope();
    bus.subscribe(&scope.of("/hello/world"), vec![counting(&scoped_calls)]);
    bus.publish(&scope.of("/hello/world"), "testing").await;

    assert_eq!(scoped_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn un_scope_inverts_scope_and_is_identity_otherwise() {
    let bus: Emitter<u8> = Emitter::new();
    let scope = bus.get_scope();

    let topic = "/hello/world";
    let scoped = scope.of(topic);

    assert_eq!(bus.un_scope(&scoped), topic);
    assert_eq!(bus.un_scope(topic), topic);
}

#[tokio::test]
async fn distinct_scopes_never_collide() {
    let bus: Emitter<u8> = Emitter::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let a = bus.get_scope();
    let b = bus.get_scope();

    bus.subscribe(&a.of("t"), vec![counting(&calls)]);
    bus.publish(&b.of("t"), 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    bus.publish(&a.of("t"), 0).await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn publish_with_no_subscribers_is_a_no_op() {
    let bus: Emitter<u8> = Emitter::new();
    bus.publish("nobody/home", 7).await;
    bus.publish("///", 7).await;
}
