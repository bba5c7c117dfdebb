use hexmap_world::{BucketLinks, BucketQueue};
use proptest::prelude::*;

#[derive(Debug, Default)]
struct Items {
    priorities: Vec<usize>,
    links: Vec<Option<usize>>,
}

impl BucketLinks for Items {
    fn priority(&self, item: usize) -> usize {
        self.priorities[item]
    }

    fn next_in_bucket(&self, item: usize) -> Option<usize> {
        self.links[item]
    }

    fn set_next_in_bucket(&mut self, item: usize, next: Option<usize>) {
        self.links[item] = next;
    }
}

#[derive(Clone, Debug)]
enum Operation {
    Enqueue(usize),
    Dequeue,
    Lower { pick: usize, by: usize },
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (0..64_usize).prop_map(Operation::Enqueue),
        2 => Just(Operation::Dequeue),
        2 => (any::<usize>(), 0..16_usize).prop_map(|(pick, by)| Operation::Lower { pick, by }),
    ]
}

proptest! {
    #[test]
    fn matches_sorted_reference(operations in prop::collection::vec(operation(), 1..300)) {
        let mut items = Items::default();
        let mut queue = BucketQueue::new();
        let mut reference: Vec<usize> = Vec::new();

        for operation in operations {
            match operation {
                Operation::Enqueue(priority) => {
                    items.priorities.push(priority);
                    items.links.push(None);
                    let item = items.priorities.len() - 1;
                    queue.enqueue(&mut items, item);
                    reference.push(item);
                }
                Operation::Dequeue => {
                    let expected = reference.iter().map(|item| items.priorities[*item]).min();
                    let popped = queue.dequeue(&mut items);
                    prop_assert_eq!(popped.map(|item| items.priorities[item]), expected);
                    if let Some(item) = popped {
                        let position = reference.iter().position(|queued| *queued == item);
                        prop_assert!(position.is_some(), "dequeued item {} was not queued", item);
                        let _ = reference.swap_remove(position.unwrap_or_default());
                    }
                }
                Operation::Lower { pick, by } => {
                    if reference.is_empty() {
                        continue;
                    }
                    let item = reference[pick % reference.len()];
                    let old_priority = items.priorities[item];
                    items.priorities[item] = old_priority.saturating_sub(by);
                    queue.change(&mut items, item, old_priority);
                }
            }
            prop_assert_eq!(queue.len(), reference.len());
        }

        let mut drained = Vec::new();
        while let Some(item) = queue.dequeue(&mut items) {
            drained.push(items.priorities[item]);
        }
        let mut expected: Vec<usize> = reference.iter().map(|item| items.priorities[*item]).collect();
        expected.sort_unstable();
        prop_assert_eq!(drained, expected);
    }
}
