//! Ownership of module instances across requests.
//!
//! A module instance is not safe to share without serialization: a reset
//! from one request would rewind the bump pointer under another request's
//! buffers. [`ModuleHost`] picks one of two policies explicitly:
//!
//! | Policy | Instances | Cost |
//! |:-------|:----------|:-----|
//! | `Shared` | one, behind a mutex held for the whole marshaling sequence | calls are serialized |
//! | `PerRequest` | a fresh instance (and fresh linear memory) per call | instantiation per call |
//!
//! Under either policy, an instance that faulted (trap, timeout, arena
//! exhaustion) is dropped rather than reused, since its allocator state is
//! unknown.

use crate::error::{Result, Txt2SvgError};
use crate::guest::GuestFactory;
use crate::marshal::{DecodedOutput, Marshaler, ModuleInstance};
use parking_lot::Mutex;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Object-safe entry point for producing SVG from inputs.
pub trait SvgGenerator: Send + Sync {
    /// Run one marshaling sequence.
    fn generate(&self, text: &str, font: &[u8], color: &str) -> Result<DecodedOutput>;
}

/// How module instances are shared between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstancePolicy {
    /// One long-lived instance; calls are serialized.
    #[default]
    Shared,
    /// A fresh instance per call.
    PerRequest,
}

impl InstancePolicy {
    /// Get the policy name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::PerRequest => "per-request",
        }
    }
}

impl FromStr for InstancePolicy {
    type Err = Txt2SvgError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "shared" => Ok(Self::Shared),
            "per-request" | "per_request" | "fresh" => Ok(Self::PerRequest),
            other => Err(Txt2SvgError::ConfigValue {
                field: "instance_policy".to_string(),
                cause: format!("unknown policy '{}', expected 'shared' or 'per-request'", other),
            }),
        }
    }
}

impl fmt::Display for InstancePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters describing instance churn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HostStats {
    /// Instances created.
    pub instantiations: u64,
    /// Instances dropped after a fault.
    pub discarded: u64,
    /// Marshaling sequences started.
    pub calls: u64,
}

/// Owns module instances and runs marshaling sequences on them.
pub struct ModuleHost<F: GuestFactory> {
    factory: F,
    policy: InstancePolicy,
    marshaler: Marshaler,
    shared: Mutex<Option<ModuleInstance<F::Guest>>>,
    instantiations: AtomicU64,
    discarded: AtomicU64,
    calls: AtomicU64,
}

impl<F: GuestFactory> ModuleHost<F> {
    /// Create a host. No instance is created until the first call.
    pub fn new(factory: F, policy: InstancePolicy, marshaler: Marshaler) -> Self {
        Self {
            factory,
            policy,
            marshaler,
            shared: Mutex::new(None),
            instantiations: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            calls: AtomicU64::new(0),
        }
    }

    /// Get the instance policy.
    pub fn policy(&self) -> InstancePolicy {
        self.policy
    }

    /// Get the marshaler.
    pub fn marshaler(&self) -> &Marshaler {
        &self.marshaler
    }

    /// Get the churn counters.
    pub fn stats(&self) -> HostStats {
        HostStats {
            instantiations: self.instantiations.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            calls: self.calls.load(Ordering::Relaxed),
        }
    }

    /// Instantiate once up front so a broken module fails at startup.
    ///
    /// Under the shared policy the instance is kept for the first call.
    pub fn warm_up(&self) -> Result<()> {
        let instance = self.instantiate()?;
        if self.policy == InstancePolicy::Shared {
            let mut slot = self.shared.lock();
            if slot.is_none() {
                *slot = Some(instance);
            }
        }
        Ok(())
    }

    fn instantiate(&self) -> Result<ModuleInstance<F::Guest>> {
        let guest = self.factory.instantiate()?;
        self.instantiations.fetch_add(1, Ordering::Relaxed);
        Ok(ModuleInstance::new(guest))
    }

    fn generate_shared(&self, text: &str, font: &[u8], color: &str) -> Result<DecodedOutput> {
        let mut slot = self.shared.lock();
        let mut instance = match slot.take() {
            Some(instance) => instance,
            None => self.instantiate()?,
        };

        let result = self.marshaler.generate(&mut instance, text, font, color);
        match &result {
            Err(e) if e.poisons_instance() => {
                self.discarded.fetch_add(1, Ordering::Relaxed);
                tracing::warn!(
                    code = e.code(),
                    calls = instance.calls(),
                    "Discarding shared module instance after fault"
                );
            }
            _ => *slot = Some(instance),
        }
        result
    }

    fn generate_fresh(&self, text: &str, font: &[u8], color: &str) -> Result<DecodedOutput> {
        let mut instance = self.instantiate()?;
        let result = self.marshaler.generate(&mut instance, text, font, color);
        if let Err(e) = &result {
            if e.poisons_instance() {
                self.discarded.fetch_add(1, Ordering::Relaxed);
            }
        }
        result
    }
}

impl<F: GuestFactory> SvgGenerator for ModuleHost<F> {
    fn generate(&self, text: &str, font: &[u8], color: &str) -> Result<DecodedOutput> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        match self.policy {
            InstancePolicy::Shared => self.generate_shared(text, font, color),
            InstancePolicy::PerRequest => self.generate_fresh(text, font, color),
        }
    }
}
