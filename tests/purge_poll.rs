use std::cell::RefCell;
use std::collections::VecDeque;
use std::num::NonZeroU32;
use std::time::Duration;

use seedload::app::ports::StoreError;
use seedload::app::{PollConfig, PollError, PollOutcome, poll_until_below_limit};

fn deletes(counts: &[u64]) -> RefCell<VecDeque<u64>> {
    RefCell::new(counts.iter().copied().collect())
}

#[tokio::test(start_paused = true)]
async fn purge_stops_on_first_short_pass() {
    let remaining = deletes(&[1000, 1000, 400]);
    let config = PollConfig::new(1000, Duration::from_secs(3))
        .with_max_duration(Duration::from_secs(60));
    let started = tokio::time::Instant::now();

    let outcome = poll_until_below_limit(
        || {
            let affected = remaining.borrow_mut().pop_front().unwrap_or(0);
            async move { Ok::<u64, StoreError>(affected) }
        },
        &config,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        PollOutcome {
            passes: 3,
            rows_processed: 2400
        }
    );
    assert_eq!(started.elapsed(), Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn purge_gives_up_at_the_attempt_cap() {
    let config = PollConfig::new(1000, Duration::from_millis(500))
        .with_max_attempts(NonZeroU32::new(4).unwrap());

    let result = poll_until_below_limit(|| async { Ok::<u64, StoreError>(1000) }, &config).await;

    assert!(matches!(
        result,
        Err(PollError::Exhausted {
            attempts: 4,
            rows_processed: 4000
        })
    ));
}

#[tokio::test(start_paused = true)]
async fn store_failure_surfaces_with_progress_so_far() {
    let remaining = deletes(&[1000]);
    let config = PollConfig::new(1000, Duration::from_secs(1))
        .with_max_attempts(NonZeroU32::new(5).unwrap());

    let result = poll_until_below_limit(
        || {
            let next = remaining.borrow_mut().pop_front();
            async move {
                next.ok_or_else(|| StoreError::QueryFailed("Lock wait timeout exceeded".to_string()))
            }
        },
        &config,
    )
    .await;

    match result {
        Err(PollError::Operation {
            pass,
            rows_processed,
            source,
        }) => {
            assert_eq!(pass, 2);
            assert_eq!(rows_processed, 1000);
            assert_eq!(
                source,
                StoreError::QueryFailed("Lock wait timeout exceeded".to_string())
            );
        }
        other => panic!("expected Operation error, got {:?}", other),
    }
}
