//! Bucketed priority queue with intrusive, index-based chaining.
//!
//! Items are plain indices. The item store owns both the priority and the
//! link to the next item sharing a bucket, so enqueuing never allocates per
//! item. Priorities are small non-negative integers whose global minimum only
//! creeps upward during a graph search, which keeps the bucket scan cheap.

/// Storage that exposes the priority and bucket link of indexed items.
pub trait BucketLinks {
    /// Current priority of the item.
    fn priority(&self, item: usize) -> usize;

    /// Next item in the same bucket.
    fn next_in_bucket(&self, item: usize) -> Option<usize>;

    /// Rewrites the link to the next item in the same bucket.
    fn set_next_in_bucket(&mut self, item: usize, next: Option<usize>);
}

/// Priority queue over indexed items grouped into one bucket per priority.
#[derive(Clone, Debug)]
pub struct BucketQueue {
    buckets: Vec<Option<usize>>,
    minimum: usize,
    count: usize,
}

impl BucketQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            buckets: Vec::new(),
            minimum: usize::MAX,
            count: 0,
        }
    }

    /// Number of queued items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Reports whether the queue holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Pushes an item onto the bucket matching its current priority.
    pub fn enqueue<L>(&mut self, links: &mut L, item: usize)
    where
        L: BucketLinks + ?Sized,
    {
        self.count += 1;
        let priority = links.priority(item);
        if priority < self.minimum {
            self.minimum = priority;
        }
        if priority >= self.buckets.len() {
            self.buckets.resize(priority + 1, None);
        }
        links.set_next_in_bucket(item, self.buckets[priority]);
        self.buckets[priority] = Some(item);
    }

    /// Pops an item with the lowest priority.
    pub fn dequeue<L>(&mut self, links: &mut L) -> Option<usize>
    where
        L: BucketLinks + ?Sized,
    {
        while self.minimum < self.buckets.len() {
            if let Some(item) = self.buckets[self.minimum] {
                self.buckets[self.minimum] = links.next_in_bucket(item);
                links.set_next_in_bucket(item, None);
                self.count -= 1;
                return Some(item);
            }
            self.minimum += 1;
        }
        None
    }

    /// Moves a queued item whose priority changed from `old_priority`.
    ///
    /// Only the old bucket is scanned. An item missing from that bucket is
    /// enqueued as if it were new.
    pub fn change<L>(&mut self, links: &mut L, item: usize, old_priority: usize)
    where
        L: BucketLinks + ?Sized,
    {
        if self.unlink(links, item, old_priority) {
            self.count -= 1;
        }
        self.enqueue(links, item);
    }

    /// Drops every queued item.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.count = 0;
        self.minimum = usize::MAX;
    }

    fn unlink<L>(&mut self, links: &mut L, item: usize, priority: usize) -> bool
    where
        L: BucketLinks + ?Sized,
    {
        let Some(head) = self.buckets.get(priority).copied().flatten() else {
            return false;
        };

        if head == item {
            self.buckets[priority] = links.next_in_bucket(item);
            return true;
        }

        let mut current = head;
        while let Some(next) = links.next_in_bucket(current) {
            if next == item {
                let after = links.next_in_bucket(item);
                links.set_next_in_bucket(current, after);
                return true;
            }
            current = next;
        }
        false
    }
}

impl Default for BucketQueue {
    fn default() -> Self {
        Self::new()
    }
}
