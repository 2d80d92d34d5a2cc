// ============================
// crates/backend-lib/src/auth/rate_limit.rs
// ============================
//! Rate limiting for login attempts.
//!
//! Every client address gets a [`TokenBucket`] holding `max_attempts`
//! tokens. A login attempt consumes one token; the bucket is topped up by
//! `max_attempts` tokens once per full window. Buckets live in a
//! [`BucketStore`] which forgets idle clients and caps the number of tracked
//! addresses.
//!
//! The refill is a fixed window, so a client that exhausts its bucket just
//! before a window boundary can spend a fresh bucket right after it: up to
//! `2 × max_attempts` attempts can land inside one wall-clock window.

use crate::auth::clock::{Clock, SystemClock};
use crate::metrics::{LOGIN_ALLOWED, LOGIN_RATE_LIMITED, RATE_LIMIT_EVICTIONS, RATE_LIMIT_TRACKED_CLIENTS};
use dashmap::DashMap;
use metrics::{counter, gauge};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Maximum number of login attempts per client per window
pub const MAX_LOGIN_ATTEMPTS: u64 = 5;

/// Length of one login window (1 minute)
pub const LOGIN_WINDOW: Duration = Duration::from_secs(60);

/// Upper bound on the number of tracked client addresses
pub const MAX_TRACKED_CLIENTS: usize = 10_000;

/// Extra idle time, on top of one window, before a bucket is forgotten
pub const EXPIRY_GRACE: Duration = Duration::from_secs(60);

/// A full store evicts `max_entries / EVICTION_BATCH_DIVISOR` entries at once
const EVICTION_BATCH_DIVISOR: usize = 100;

/// Limits applied by [`LoginRateLimiter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginRateLimitPolicy {
    /// Bucket capacity, also the number of tokens added per window
    pub max_attempts: u64,
    /// Refill period
    pub window: Duration,
    /// Size bound of the bucket store
    pub max_tracked_clients: usize,
    /// Idle time past one window after which a bucket expires
    pub expiry_grace: Duration,
}

impl Default for LoginRateLimitPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_LOGIN_ATTEMPTS,
            window: LOGIN_WINDOW,
            max_tracked_clients: MAX_TRACKED_CLIENTS,
            expiry_grace: EXPIRY_GRACE,
        }
    }
}

impl LoginRateLimitPolicy {
    /// Idle time after which a client's bucket is dropped
    pub fn idle_expiry(&self) -> Duration {
        self.window.saturating_add(self.expiry_grace)
    }
}

/// Token bucket with intervallic refill.
///
/// Invariant: `0 <= available <= capacity`.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: u64,
    refill_tokens: u64,
    refill_period: Duration,
    available: u64,
    /// Start of the current refill period
    last_refill: Instant,
}

impl TokenBucket {
    /// Create a full bucket whose first period starts at `now`
    pub fn new(capacity: u64, refill_tokens: u64, refill_period: Duration, now: Instant) -> Self {
        Self {
            capacity,
            refill_tokens,
            refill_period,
            available: capacity,
            last_refill: now,
        }
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn refill_period(&self) -> Duration {
        self.refill_period
    }

    /// Tokens available at `now`, counting refills that are due
    pub fn available_tokens(&self, now: Instant) -> u64 {
        self.refilled(now).0
    }

    /// Take `tokens` from the bucket if that many are available
    pub fn try_consume(&mut self, tokens: u64, now: Instant) -> bool {
        let (available, last_refill) = self.refilled(now);
        self.available = available;
        self.last_refill = last_refill;

        if self.available >= tokens {
            self.available -= tokens;
            true
        } else {
            false
        }
    }

    /// Token count and period start after applying every complete period
    /// between `last_refill` and `now`.
    fn refilled(&self, now: Instant) -> (u64, Instant) {
        if self.refill_period.is_zero() {
            return (self.capacity, now);
        }

        let elapsed = now.saturating_duration_since(self.last_refill);
        let periods = elapsed.as_nanos() / self.refill_period.as_nanos();
        if periods == 0 {
            return (self.available, self.last_refill);
        }

        let added = u64::try_from(periods)
            .unwrap_or(u64::MAX)
            .saturating_mul(self.refill_tokens);
        let available = self.available.saturating_add(added).min(self.capacity);

        let advanced = u64::try_from(periods * self.refill_period.as_nanos())
            .ok()
            .and_then(|nanos| self.last_refill.checked_add(Duration::from_nanos(nanos)))
            .unwrap_or(now);

        (available, advanced)
    }
}

/// Entry in the bucket store
#[derive(Debug)]
struct BucketEntry {
    bucket: TokenBucket,
    last_access: Instant,
}

/// Concurrent map from client key to token bucket with passive expiry.
///
/// Expiry is checked on access: an entry idle for longer than `idle_expiry`
/// is reset when its key comes back, and purged when room is needed.
#[derive(Debug)]
pub struct BucketStore {
    buckets: DashMap<String, BucketEntry>,
    max_entries: usize,
    idle_expiry: Duration,
}

impl BucketStore {
    pub fn new(max_entries: usize, idle_expiry: Duration) -> Self {
        Self {
            buckets: DashMap::new(),
            max_entries: max_entries.max(1),
            idle_expiry,
        }
    }

    /// Run `f` on the live bucket for `key`, creating it with `create` when
    /// the key is new or its bucket has expired.
    ///
    /// The bucket's shard stays locked while `f` runs, so a read-modify-write
    /// in `f` is atomic per key.
    pub fn with_bucket<R>(
        &self,
        key: &str,
        now: Instant,
        create: impl Fn() -> TokenBucket,
        f: impl FnOnce(&mut TokenBucket) -> R,
    ) -> R {
        // Must not hold a shard guard here; eviction locks every shard.
        if !self.buckets.contains_key(key) && self.buckets.len() >= self.max_entries {
            self.evict(now);
        }

        let mut entry = self
            .buckets
            .entry(key.to_owned())
            .or_insert_with(|| BucketEntry {
                bucket: create(),
                last_access: now,
            });

        if self.is_expired(&entry, now) {
            entry.bucket = create();
        }
        entry.last_access = now;

        f(&mut entry.bucket)
    }

    /// Read the live bucket for `key` without creating or touching it
    pub fn peek<R>(&self, key: &str, now: Instant, f: impl FnOnce(&TokenBucket) -> R) -> Option<R> {
        self.buckets
            .get(key)
            .filter(|entry| !self.is_expired(entry, now))
            .map(|entry| f(&entry.bucket))
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drop every expired entry, returning how many were removed
    pub fn purge_expired(&self, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, entry| !self.is_expired(entry, now));
        before.saturating_sub(self.buckets.len())
    }

    /// Make room for one more entry.
    ///
    /// Expired entries go first. If that is not enough, the least recently
    /// touched entries are dropped in a batch of `max_entries / 100` (at
    /// least one), so a full store pays one O(n) scan per batch of new
    /// clients rather than one per new client.
    fn evict(&self, now: Instant) {
        let purged = self.purge_expired(now);
        let mut evicted = 0usize;

        let len = self.buckets.len();
        if len >= self.max_entries {
            let needed = len + 1 - self.max_entries;
            let batch = needed.max(self.max_entries / EVICTION_BATCH_DIVISOR).min(len);

            let mut by_age: Vec<(Instant, String)> = self
                .buckets
                .iter()
                .map(|entry| (entry.value().last_access, entry.key().clone()))
                .collect();
            if batch < by_age.len() {
                by_age.select_nth_unstable_by_key(batch, |(last_access, _)| *last_access);
            }

            for (_, key) in by_age.into_iter().take(batch) {
                if self.buckets.remove(&key).is_some() {
                    evicted += 1;
                }
            }
        }

        let removed = purged + evicted;
        if removed > 0 {
            counter!(RATE_LIMIT_EVICTIONS).increment(removed as u64);
            debug!(purged, evicted, "Evicted login rate limit buckets");
        }
    }

    fn is_expired(&self, entry: &BucketEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_access) > self.idle_expiry
    }
}

/// Rate limiter for login attempts, keyed by client IP address
#[derive(Debug, Clone)]
pub struct LoginRateLimiter {
    store: Arc<BucketStore>,
    policy: LoginRateLimitPolicy,
    clock: Arc<dyn Clock>,
}

impl Default for LoginRateLimiter {
    fn default() -> Self {
        Self::new(LoginRateLimitPolicy::default())
    }
}

impl LoginRateLimiter {
    /// Create a new login rate limiter on the system clock
    pub fn new(policy: LoginRateLimitPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    pub fn with_clock(policy: LoginRateLimitPolicy, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(BucketStore::new(
                policy.max_tracked_clients,
                policy.idle_expiry(),
            )),
            policy,
            clock,
        }
    }

    pub fn policy(&self) -> &LoginRateLimitPolicy {
        &self.policy
    }

    /// Check whether a login attempt from `ip_address` may proceed.
    ///
    /// Consumes one token when it returns `true`.
    pub fn is_login_allowed(&self, ip_address: &str) -> bool {
        let now = self.clock.now();
        let allowed = self.store.with_bucket(
            ip_address,
            now,
            || self.new_bucket(now),
            |bucket| bucket.try_consume(1, now),
        );

        gauge!(RATE_LIMIT_TRACKED_CLIENTS).set(self.store.len() as f64);

        if allowed {
            counter!(LOGIN_ALLOWED).increment(1);
        } else {
            counter!(LOGIN_RATE_LIMITED).increment(1);
            warn!(ip = %ip_address, "Login rate limit exceeded for IP: {ip_address}");
        }
        allowed
    }

    /// Remaining login attempts for `ip_address` in the current window.
    ///
    /// Returns the full allowance for addresses without a live bucket.
    pub fn remaining_login_attempts(&self, ip_address: &str) -> u64 {
        let now = self.clock.now();
        self.store
            .peek(ip_address, now, |bucket| bucket.available_tokens(now))
            .unwrap_or(self.policy.max_attempts)
    }

    /// Number of client addresses currently tracked
    pub fn tracked_clients(&self) -> usize {
        self.store.len()
    }

    /// Drop expired buckets
    pub fn purge_expired(&self) -> usize {
        let removed = self.store.purge_expired(self.clock.now());
        gauge!(RATE_LIMIT_TRACKED_CLIENTS).set(self.store.len() as f64);
        removed
    }

    fn new_bucket(&self, now: Instant) -> TokenBucket {
        TokenBucket::new(
            self.policy.max_attempts,
            self.policy.max_attempts,
            self.policy.window,
            now,
        )
    }
}
