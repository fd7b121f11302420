mod common;

use common::{ChannelObserver, MockTransport, Observed, page_payload};
use kodegen_tools_instantsearch::{SearchTransport, Searcher, SequenceNumber};
use proptest::prelude::*;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Op {
    Search,
    LoadMore,
    /// Resolve the n-th request modulo the number issued so far
    Resolve { pick: usize, hits: bool },
    Cancel,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Search),
        2 => Just(Op::LoadMore),
        6 => (any::<usize>(), any::<bool>()).prop_map(|(pick, hits)| Op::Resolve { pick, hits }),
        1 => Just(Op::Cancel),
    ]
}

async fn drain() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

/// Run `ops` and return every sequence number observers were given
fn run(ops: Vec<Op>) -> (Vec<SequenceNumber>, Vec<SequenceNumber>) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("runtime builds");

    runtime.block_on(async move {
        let transport = MockTransport::new();
        let shared: Arc<dyn SearchTransport> = transport.clone();
        let searcher = Searcher::builder(shared).build().expect("searcher builds");
        let (observer, mut observed) = ChannelObserver::new();
        searcher.register_observer(observer);

        let mut resolved = Vec::new();
        let mut displayed = Vec::new();
        for op in ops {
            match op {
                Op::Search => {
                    searcher.search();
                }
                Op::LoadMore => {
                    searcher.load_more();
                }
                Op::Cancel => {
                    searcher.cancel_pending_requests();
                }
                Op::Resolve { pick, hits } => {
                    let count = transport.request_count();
                    if count == 0 {
                        continue;
                    }
                    let index = pick % count;
                    if resolved.contains(&index) {
                        continue;
                    }
                    resolved.push(index);
                    let page = transport.query(index).page();
                    transport.resolve(index, Ok(page_payload(page, 4, if hits { 3 } else { 0 })));
                }
            }
            drain().await;
            displayed.push(searcher.last_displayed_sequence());
        }

        drain().await;
        let mut notified = Vec::new();
        while let Ok(observation) = observed.try_recv() {
            if let Observed::Results { sequence, .. } = observation {
                notified.push(sequence);
            }
        }
        (notified, displayed)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn observers_see_strictly_increasing_sequences(ops in prop::collection::vec(op_strategy(), 1..40)) {
        let (notified, displayed) = run(ops);
        prop_assert!(notified.windows(2).all(|pair| pair[0] < pair[1]), "notified out of order: {:?}", notified);
        prop_assert!(displayed.windows(2).all(|pair| pair[0] <= pair[1]), "last displayed decreased: {:?}", displayed);
    }
}
