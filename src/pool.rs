//! Generic bounded connection pool
//!
//! Hands out at most `max_size` live connections created by a factory,
//! recycling returned ones. Callers block when the pool is exhausted until
//! another holder returns or disposes a connection.
//!
//! # Connection Lifecycle
//!
//! ```text
//!   factory ──► Fresh ──► Leased ──► Idle ──► Leased ──► ...
//!                            │                   │
//!                            └──── dispose ──────┴──► Disposed (removed)
//! ```
//!
//! Connections are:
//! - Created on demand up to the pool limit
//! - Returned to the pool after use (explicitly or when the lease drops)
//! - Never re-issued once disposed
//!
//! All state transitions happen under a single mutex. A slot is reserved
//! under the lock before the factory runs, so the factory itself is invoked
//! without holding the lock and the size bound still holds.

use crate::error::{PoolError, PoolResult};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::HashSet;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Identifier assigned by the pool to every connection it creates
pub type ConnectionId = u64;

/// Error type produced by connection factories
pub type FactoryError = Box<dyn std::error::Error + Send + Sync>;

/// A resource that can live in a [`Pool`]
pub trait PooledResource: Send + 'static {
    /// Mark the resource as permanently unusable
    fn mark_disposed(&mut self);

    /// Whether [`mark_disposed`](Self::mark_disposed) has been called
    fn is_disposed(&self) -> bool;
}

/// Capability that produces new connections for a pool
pub trait ConnectionFactory<C>: Send + Sync {
    fn create(&self) -> Result<C, FactoryError>;
}

impl<C, F, E> ConnectionFactory<C> for F
where
    F: Fn() -> Result<C, E> + Send + Sync,
    E: Into<FactoryError>,
{
    fn create(&self) -> Result<C, FactoryError> {
        self().map_err(Into::into)
    }
}

/// Configuration for a [`Pool`]
pub struct PoolConfig<C> {
    name: String,
    factory: Arc<dyn ConnectionFactory<C>>,
    max_size: usize,
    mutable: bool,
}

impl<C> PoolConfig<C> {
    /// Create an immutable pool configuration
    pub fn new<F>(name: impl Into<String>, factory: F, max_size: usize) -> Self
    where
        F: ConnectionFactory<C> + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
            max_size,
            mutable: false,
        }
    }

    /// Allow `max_size` and the factory to be changed after construction
    pub fn mutable(mut self) -> Self {
        self.mutable = true;
        self
    }

    /// Pool name (diagnostic only)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum number of live connections
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Validate the configuration
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_size == 0 {
            return Err(PoolError::InvalidMaxSize {
                pool: self.name.clone(),
                size: self.max_size,
            });
        }
        Ok(())
    }
}

impl<C> fmt::Debug for PoolConfig<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PoolConfig")
            .field("name", &self.name)
            .field("max_size", &self.max_size)
            .field("mutable", &self.mutable)
            .finish_non_exhaustive()
    }
}

/// Point-in-time view of a pool's accounting
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Pool name
    pub name: String,
    /// Current capacity
    pub max_size: usize,
    /// Connections waiting to be leased
    pub idle: usize,
    /// Connections currently leased
    pub in_use: usize,
    /// Slots reserved while the factory runs
    pub creating: usize,
    /// Total connections ever created by the factory
    pub created: u64,
    /// Total connections disposed
    pub disposed: u64,
}

impl PoolStats {
    /// Connections counted against `max_size`
    pub fn live(&self) -> usize {
        self.idle + self.in_use + self.creating
    }
}

struct PoolState<C> {
    /// Idle connections, most recently returned last
    idle: Vec<(ConnectionId, C)>,
    /// Ids of leased connections
    in_use: HashSet<ConnectionId>,
    /// Slots reserved while the factory runs
    creating: usize,
    next_id: ConnectionId,
    max_size: usize,
    factory: Arc<dyn ConnectionFactory<C>>,
    created: u64,
    disposed: u64,
}

impl<C> PoolState<C> {
    fn live(&self) -> usize {
        self.idle.len() + self.in_use.len() + self.creating
    }
}

struct PoolInner<C> {
    name: String,
    mutable: bool,
    state: Mutex<PoolState<C>>,
    /// Signalled whenever a slot or idle connection may have become available
    available: Condvar,
}

/// Outcome of one checkout attempt under the lock
enum Checkout<C> {
    Idle(ConnectionId, C),
    Create(Arc<dyn ConnectionFactory<C>>),
    Exhausted,
}

/// Bounded, thread-safe pool of reusable connections
///
/// Cloning a `Pool` yields another handle to the same pool.
pub struct Pool<C: PooledResource> {
    inner: Arc<PoolInner<C>>,
}

impl<C: PooledResource> Clone for Pool<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: PooledResource> Pool<C> {
    /// Create a pool from a validated configuration
    pub fn new(config: PoolConfig<C>) -> PoolResult<Self> {
        config.validate()?;

        debug!(pool = %config.name, max_size = config.max_size, "Creating pool");

        Ok(Self {
            inner: Arc::new(PoolInner {
                name: config.name,
                mutable: config.mutable,
                state: Mutex::new(PoolState {
                    idle: Vec::with_capacity(config.max_size),
                    in_use: HashSet::with_capacity(config.max_size),
                    creating: 0,
                    next_id: 1,
                    max_size: config.max_size,
                    factory: config.factory,
                    created: 0,
                    disposed: 0,
                }),
                available: Condvar::new(),
            }),
        })
    }

    /// Pool name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Current capacity
    pub fn max_size(&self) -> usize {
        self.inner.state.lock().max_size
    }

    /// Whether the configuration can be changed after construction
    pub fn is_mutable(&self) -> bool {
        self.inner.mutable
    }

    /// Snapshot of the pool's accounting
    pub fn stats(&self) -> PoolStats {
        let state = self.inner.state.lock();
        PoolStats {
            name: self.inner.name.clone(),
            max_size: state.max_size,
            idle: state.idle.len(),
            in_use: state.in_use.len(),
            creating: state.creating,
            created: state.created,
            disposed: state.disposed,
        }
    }

    /// Borrow a connection, blocking while the pool is exhausted
    ///
    /// Returns an idle connection if one exists, otherwise creates one if
    /// under the limit, otherwise waits until another holder returns or
    /// disposes a connection.
    pub fn get_connection(&self) -> PoolResult<Leased<C>> {
        let mut state = self.inner.state.lock();
        loop {
            match self.checkout(&mut state) {
                Checkout::Idle(id, conn) => return Ok(self.lease(id, conn)),
                Checkout::Create(factory) => {
                    drop(state);
                    return self.create(factory.as_ref());
                }
                Checkout::Exhausted => {
                    trace!(pool = %self.inner.name, "Pool exhausted, waiting");
                    self.inner.available.wait(&mut state);
                }
            }
        }
    }

    /// Borrow a connection without waiting
    ///
    /// Returns `Ok(None)` when every slot is in use.
    pub fn try_get_connection(&self) -> PoolResult<Option<Leased<C>>> {
        let mut state = self.inner.state.lock();
        match self.checkout(&mut state) {
            Checkout::Idle(id, conn) => Ok(Some(self.lease(id, conn))),
            Checkout::Create(factory) => {
                drop(state);
                self.create(factory.as_ref()).map(Some)
            }
            Checkout::Exhausted => Ok(None),
        }
    }

    /// Return a lease to this pool
    ///
    /// A lease belonging to another pool is handed back to its own pool and
    /// reported as an error.
    pub fn return_to_pool(&self, lease: Leased<C>) -> PoolResult<()> {
        if !self.owns(&lease) {
            let id = lease.id;
            drop(lease);
            return Err(PoolError::ForeignConnection {
                pool: self.inner.name.clone(),
                id,
            });
        }
        lease.return_to_pool();
        Ok(())
    }

    /// Dispose a lease taken from this pool, returning the detached connection
    pub fn dispose(&self, lease: Leased<C>) -> PoolResult<C> {
        if !self.owns(&lease) {
            let id = lease.id;
            drop(lease);
            return Err(PoolError::ForeignConnection {
                pool: self.inner.name.clone(),
                id,
            });
        }
        Ok(lease.dispose())
    }

    /// Pre-create idle connections
    ///
    /// Creates at most `count` connections and never exceeds `max_size`.
    /// Returns how many connections were created.
    pub fn warm(&self, count: usize) -> PoolResult<usize> {
        let mut warmed = 0;
        while warmed < count {
            let factory = {
                let mut state = self.inner.state.lock();
                if state.live() >= state.max_size {
                    break;
                }
                state.creating += 1;
                Arc::clone(&state.factory)
            };

            let lease = self.create(factory.as_ref())?;
            lease.return_to_pool();
            warmed += 1;
        }

        debug!(pool = %self.inner.name, warmed, "Warmed pool");
        Ok(warmed)
    }

    /// Change the capacity of a mutable pool
    ///
    /// Lowering the capacity never evicts leased connections; it caps future
    /// creation and drops surplus idle connections.
    pub fn set_max_size(&self, max_size: usize) -> PoolResult<()> {
        self.ensure_mutable()?;
        if max_size == 0 {
            return Err(PoolError::InvalidMaxSize {
                pool: self.inner.name.clone(),
                size: max_size,
            });
        }

        let surplus = {
            let mut state = self.inner.state.lock();
            state.max_size = max_size;
            let excess = state.live().saturating_sub(max_size).min(state.idle.len());
            // Oldest idle connections go first
            state.idle.drain(..excess).collect::<Vec<_>>()
        };

        debug!(
            pool = %self.inner.name,
            max_size,
            dropped = surplus.len(),
            "Changed pool capacity"
        );
        self.inner.available.notify_all();
        Ok(())
    }

    /// Replace the factory of a mutable pool
    ///
    /// Only connections created afterwards are affected.
    pub fn set_factory<F>(&self, factory: F) -> PoolResult<()>
    where
        F: ConnectionFactory<C> + 'static,
    {
        self.ensure_mutable()?;
        self.inner.state.lock().factory = Arc::new(factory);
        debug!(pool = %self.inner.name, "Replaced pool factory");
        Ok(())
    }

    fn ensure_mutable(&self) -> PoolResult<()> {
        if self.inner.mutable {
            Ok(())
        } else {
            Err(PoolError::ConfigLocked {
                pool: self.inner.name.clone(),
            })
        }
    }

    fn owns(&self, lease: &Leased<C>) -> bool {
        Arc::ptr_eq(&self.inner, &lease.pool.inner)
    }

    fn checkout(&self, state: &mut MutexGuard<'_, PoolState<C>>) -> Checkout<C> {
        if let Some((id, conn)) = state.idle.pop() {
            state.in_use.insert(id);
            debug!(
                pool = %self.inner.name,
                id,
                idle = state.idle.len(),
                "Acquired existing connection from pool"
            );
            return Checkout::Idle(id, conn);
        }

        if state.live() < state.max_size {
            state.creating += 1;
            return Checkout::Create(Arc::clone(&state.factory));
        }

        Checkout::Exhausted
    }

    /// Run the factory for a slot already reserved under the lock
    fn create(&self, factory: &dyn ConnectionFactory<C>) -> PoolResult<Leased<C>> {
        let reservation = Reservation::new(self);
        let result = factory.create();
        reservation.complete(result)
    }

    fn finish_create(&self, result: Result<C, FactoryError>) -> PoolResult<Leased<C>> {
        let mut state = self.inner.state.lock();
        state.creating -= 1;

        match result {
            Ok(conn) => {
                let id = state.next_id;
                state.next_id += 1;
                state.created += 1;
                state.in_use.insert(id);
                debug!(
                    pool = %self.inner.name,
                    id,
                    live = state.live(),
                    max = state.max_size,
                    "Created new connection"
                );
                drop(state);
                Ok(self.lease(id, conn))
            }
            Err(source) => {
                drop(state);
                // The reserved slot is free again
                self.inner.available.notify_one();
                debug!(pool = %self.inner.name, error = %source, "Connection factory failed");
                Err(PoolError::Factory {
                    pool: self.inner.name.clone(),
                    source,
                })
            }
        }
    }

    fn lease(&self, id: ConnectionId, conn: C) -> Leased<C> {
        Leased {
            conn: Some(conn),
            id,
            pool: self.clone(),
        }
    }

    /// Put a leased connection back, or drop it if disposed or surplus
    fn release(&self, id: ConnectionId, conn: C) {
        let mut state = self.inner.state.lock();
        if !state.in_use.remove(&id) {
            trace!(pool = %self.inner.name, id, "Ignoring release of unknown connection");
            return;
        }

        if conn.is_disposed() {
            state.disposed += 1;
            debug!(pool = %self.inner.name, id, "Dropped disposed connection on return");
        } else if state.live() >= state.max_size {
            debug!(pool = %self.inner.name, id, "Dropped surplus connection on return");
        } else {
            state.idle.push((id, conn));
            debug!(
                pool = %self.inner.name,
                id,
                idle = state.idle.len(),
                "Returned connection to pool"
            );
        }

        drop(state);
        self.inner.available.notify_one();
    }

    /// Remove a disposed connection from accounting
    fn forget(&self, id: ConnectionId) {
        let mut state = self.inner.state.lock();
        if state.in_use.remove(&id) {
            state.disposed += 1;
            debug!(
                pool = %self.inner.name,
                id,
                in_use = state.in_use.len(),
                "Disposed connection"
            );
        }
        drop(state);
        self.inner.available.notify_one();
    }
}

/// A slot reserved for a connection the factory has not produced yet
///
/// Dropping an uncompleted reservation (the factory panicked) gives the slot
/// back and wakes a waiter.
struct Reservation<'a, C: PooledResource> {
    pool: &'a Pool<C>,
    armed: bool,
}

impl<'a, C: PooledResource> Reservation<'a, C> {
    fn new(pool: &'a Pool<C>) -> Self {
        Self { pool, armed: true }
    }

    fn complete(mut self, result: Result<C, FactoryError>) -> PoolResult<Leased<C>> {
        self.armed = false;
        self.pool.finish_create(result)
    }
}

impl<C: PooledResource> Drop for Reservation<'_, C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.pool.inner.state.lock();
        state.creating -= 1;
        drop(state);
        warn!(
            pool = %self.pool.inner.name,
            "Connection factory panicked, released reserved slot"
        );
        self.pool.inner.available.notify_one();
    }
}

impl<C: PooledResource> fmt::Debug for Pool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pool").field("stats", &self.stats()).finish()
    }
}

/// A leased connection with automatic return to the pool on drop
pub struct Leased<C: PooledResource> {
    /// The connection (Option for taking on drop)
    conn: Option<C>,
    id: ConnectionId,
    pool: Pool<C>,
}

impl<C: PooledResource> Leased<C> {
    /// Pool-assigned identifier of the connection
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Name of the pool this lease came from
    pub fn pool_name(&self) -> &str {
        self.pool.name()
    }

    /// Make the connection available to other borrowers
    pub fn return_to_pool(mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(self.id, conn);
        }
    }

    /// Permanently remove the connection from the pool
    ///
    /// The connection is marked disposed and handed back detached from the
    /// pool so it can still be inspected.
    pub fn dispose(mut self) -> C {
        let mut conn = self.conn.take().expect("Connection already taken");
        conn.mark_disposed();
        self.pool.forget(self.id);
        conn
    }
}

impl<C: PooledResource> Deref for Leased<C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.conn.as_ref().expect("Connection already taken")
    }
}

impl<C: PooledResource> DerefMut for Leased<C> {
    fn deref_mut(&mut self) -> &mut C {
        self.conn.as_mut().expect("Connection already taken")
    }
}

impl<C: PooledResource> Drop for Leased<C> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(self.id, conn);
        }
    }
}

impl<C: PooledResource + fmt::Debug> fmt::Debug for Leased<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leased")
            .field("id", &self.id)
            .field("pool", &self.pool.name())
            .field("conn", &self.conn)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[derive(Debug)]
    struct TestConn {
        serial: usize,
        disposed: bool,
    }

    impl PooledResource for TestConn {
        fn mark_disposed(&mut self) {
            self.disposed = true;
        }

        fn is_disposed(&self) -> bool {
            self.disposed
        }
    }

    fn counting_pool(name: &str, max_size: usize) -> (Pool<TestConn>, Arc<AtomicUsize>) {
        let counter = Arc::new(AtomicUsize::new(0));
        let factory_counter = Arc::clone(&counter);
        let config = PoolConfig::new(
            name,
            move || -> Result<TestConn, FactoryError> {
                let serial = factory_counter.fetch_add(1, Ordering::SeqCst);
                Ok(TestConn {
                    serial,
                    disposed: false,
                })
            },
            max_size,
        );
        (Pool::new(config).unwrap(), counter)
    }

    #[test]
    fn test_returned_connection_is_reused() {
        let (pool, counter) = counting_pool("reuse", 2);

        let first = pool.get_connection().unwrap();
        let id = first.id();
        first.return_to_pool();

        let second = pool.get_connection().unwrap();
        assert_eq!(second.id(), id);
        assert_eq!(second.serial, 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(pool.stats().created, 1);
    }

    #[test]
    fn test_drop_returns_connection() {
        let (pool, _) = counting_pool("drop", 1);
        {
            let _lease = pool.get_connection().unwrap();
            assert_eq!(pool.stats().in_use, 1);
        }
        let stats = pool.stats();
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.idle, 1);
    }

    #[test]
    fn test_try_get_on_exhausted_pool() {
        let (pool, _) = counting_pool("bounded", 2);
        let _a = pool.get_connection().unwrap();
        let _b = pool.get_connection().unwrap();

        assert!(pool.try_get_connection().unwrap().is_none());
        assert_eq!(pool.stats().live(), 2);
    }

    #[test]
    fn test_dispose_frees_slot() {
        let (pool, counter) = counting_pool("dispose", 1);

        let lease = pool.get_connection().unwrap();
        let old_id = lease.id();
        let conn = lease.dispose();
        assert!(conn.is_disposed());

        let replacement = pool.get_connection().unwrap();
        assert_ne!(replacement.id(), old_id);
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        let stats = pool.stats();
        assert_eq!(stats.disposed, 1);
        assert_eq!(stats.in_use, 1);
    }

    #[test]
    fn test_disposed_connection_not_reissued() {
        let (pool, _) = counting_pool("disposed-return", 1);

        let mut lease = pool.get_connection().unwrap();
        lease.mark_disposed();
        lease.return_to_pool();

        let stats = pool.stats();
        assert_eq!(stats.idle, 0);
        assert_eq!(stats.disposed, 1);
    }

    #[test]
    fn test_factory_failure_does_not_consume_slot() {
        let fail = Arc::new(AtomicBool::new(true));
        let factory_fail = Arc::clone(&fail);
        let config = PoolConfig::new(
            "flaky",
            move || -> Result<TestConn, FactoryError> {
                if factory_fail.load(Ordering::SeqCst) {
                    Err("factory offline".into())
                } else {
                    Ok(TestConn {
                        serial: 0,
                        disposed: false,
                    })
                }
            },
            1,
        );
        let pool = Pool::new(config).unwrap();

        let err = pool.get_connection().unwrap_err();
        assert!(matches!(err, PoolError::Factory { .. }));
        assert_eq!(pool.stats().created, 0);
        assert_eq!(pool.stats().live(), 0);

        fail.store(false, Ordering::SeqCst);
        assert!(pool.get_connection().is_ok());
        assert_eq!(pool.stats().created, 1);
    }

    #[test]
    fn test_panicking_factory_releases_slot() {
        let panic_next = Arc::new(AtomicBool::new(true));
        let factory_panic = Arc::clone(&panic_next);
        let config = PoolConfig::new(
            "panicky",
            move || -> Result<TestConn, FactoryError> {
                if factory_panic.load(Ordering::SeqCst) {
                    panic!("factory blew up");
                }
                Ok(TestConn {
                    serial: 0,
                    disposed: false,
                })
            },
            1,
        );
        let pool = Pool::new(config).unwrap();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| pool.get_connection()));
        assert!(outcome.is_err());
        assert_eq!(pool.stats().creating, 0);
        assert_eq!(pool.stats().live(), 0);

        panic_next.store(false, Ordering::SeqCst);
        let lease = pool.try_get_connection().unwrap();
        assert!(lease.is_some());
        assert_eq!(pool.stats().created, 1);
    }

    #[test]
    fn test_contended_pool_never_shares_a_connection() {
        const THREADS: usize = 8;
        const ROUNDS: usize = 50;

        let (pool, counter) = counting_pool("contended", 3);
        let held = Arc::new(Mutex::new(HashSet::new()));
        let (tx, rx) = crossbeam_channel::unbounded();

        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let pool = pool.clone();
                let held = Arc::clone(&held);
                let tx = tx.clone();
                thread::spawn(move || {
                    for _ in 0..ROUNDS {
                        let lease = pool.get_connection().unwrap();
                        assert!(held.lock().insert(lease.id()), "id leased twice");
                        assert!(pool.stats().live() <= 3);
                        thread::yield_now();
                        held.lock().remove(&lease.id());
                        tx.send(lease.id()).unwrap();
                        lease.return_to_pool();
                    }
                })
            })
            .collect();
        drop(tx);

        for worker in workers {
            worker.join().unwrap();
        }

        let borrows: Vec<ConnectionId> = rx.iter().collect();
        assert_eq!(borrows.len(), THREADS * ROUNDS);
        assert!(counter.load(Ordering::SeqCst) <= 3);
        assert!(borrows.iter().all(|id| (1..=3).contains(id)));

        let stats = pool.stats();
        assert_eq!(stats.in_use, 0);
        assert!(stats.idle <= 3);
    }

    #[test]
    fn test_blocked_borrower_receives_returned_connection() {
        let (pool, counter) = counting_pool("blocking", 1);
        let lease = pool.get_connection().unwrap();
        let id = lease.id();

        let (tx, rx) = crossbeam_channel::bounded(1);
        let waiter_pool = pool.clone();
        let waiter = thread::spawn(move || {
            let lease = waiter_pool.get_connection().unwrap();
            tx.send(lease.id()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        lease.return_to_pool();

        let received = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(received, id);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        waiter.join().unwrap();
    }

    #[test]
    fn test_foreign_lease_rejected() {
        let (pool_a, _) = counting_pool("a", 1);
        let (pool_b, _) = counting_pool("b", 1);

        let lease = pool_a.get_connection().unwrap();
        let err = pool_b.return_to_pool(lease).unwrap_err();
        assert!(matches!(err, PoolError::ForeignConnection { .. }));

        // Handed back to its own pool
        assert_eq!(pool_a.stats().idle, 1);
        assert_eq!(pool_b.stats().idle, 0);
    }

    #[test]
    fn test_immutable_config_rejects_changes() {
        let (pool, _) = counting_pool("locked", 1);
        assert!(!pool.is_mutable());
        assert!(matches!(
            pool.set_max_size(4),
            Err(PoolError::ConfigLocked { .. })
        ));
    }

    #[test]
    fn test_shrink_keeps_leased_connections() {
        let config = PoolConfig::new(
            "shrink",
            || -> Result<TestConn, FactoryError> {
                Ok(TestConn {
                    serial: 0,
                    disposed: false,
                })
            },
            3,
        )
        .mutable();
        let pool = Pool::new(config).unwrap();

        let a = pool.get_connection().unwrap();
        let b = pool.get_connection().unwrap();
        pool.set_max_size(1).unwrap();

        // Both leases survive the shrink
        assert_eq!(pool.stats().in_use, 2);
        assert!(pool.try_get_connection().unwrap().is_none());

        a.return_to_pool();
        b.return_to_pool();
        let stats = pool.stats();
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.max_size, 1);
    }

    #[test]
    fn test_set_factory_affects_new_connections_only() {
        let config = PoolConfig::new(
            "refactory",
            || -> Result<TestConn, FactoryError> {
                Ok(TestConn {
                    serial: 1,
                    disposed: false,
                })
            },
            2,
        )
        .mutable();
        let pool = Pool::new(config).unwrap();

        let first = pool.get_connection().unwrap();
        pool.set_factory(|| -> Result<TestConn, FactoryError> {
            Ok(TestConn {
                serial: 2,
                disposed: false,
            })
        })
        .unwrap();
        let second = pool.get_connection().unwrap();

        assert_eq!(first.serial, 1);
        assert_eq!(second.serial, 2);
    }

    #[test]
    fn test_warm_respects_capacity() {
        let (pool, counter) = counting_pool("warm", 2);
        assert_eq!(pool.warm(5).unwrap(), 2);
        assert_eq!(counter.load(Ordering::SeqCst), 2);
        assert_eq!(pool.stats().idle, 2);
    }

    #[test]
    fn test_zero_max_size_rejected() {
        let config = PoolConfig::new(
            "empty",
            || -> Result<TestConn, FactoryError> {
                Ok(TestConn {
                    serial: 0,
                    disposed: false,
                })
            },
            0,
        );
        assert!(matches!(
            Pool::new(config),
            Err(PoolError::InvalidMaxSize { size: 0, .. })
        ));
    }
}
