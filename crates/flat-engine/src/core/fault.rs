use std::any::Any;
use std::fmt;

use crate::api::script::{Hook, ScriptKind};
use crate::api::types::EntityId;

/// Something that went wrong during a tick without stopping the loop.
#[derive(Debug, Clone, PartialEq)]
pub struct TickFault {
    pub tick: u64,
    /// Entity being processed, if the fault is attributable to one.
    pub entity: Option<EntityId>,
    /// Script whose hook failed.
    pub script: Option<ScriptKind>,
    pub hook: Option<Hook>,
    pub reason: FaultReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaultReason {
    /// A hook returned `Err`.
    Error(String),
    /// Code panicked; the payload message if it was a string.
    Panic(String),
}

impl fmt::Display for TickFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {}", self.tick)?;
        if let Some(entity) = self.entity {
            write!(f, ", entity {}", entity.0)?;
        }
        if let Some(script) = self.script {
            write!(f, ", script {}", script)?;
        }
        if let Some(hook) = self.hook {
            write!(f, ", {:?}", hook)?;
        }
        match &self.reason {
            FaultReason::Error(msg) => write!(f, ": error: {}", msg),
            FaultReason::Panic(msg) => write!(f, ": panic: {}", msg),
        }
    }
}

/// Extract a readable message from a `catch_unwind` payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// Faults collected during one tick.
#[derive(Debug, Default)]
pub struct FaultLog {
    tick: u64,
    faults: Vec<TickFault>,
}

impl FaultLog {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            faults: Vec::new(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn record(
        &mut self,
        entity: Option<EntityId>,
        script: Option<ScriptKind>,
        hook: Option<Hook>,
        reason: FaultReason,
    ) {
        let fault = TickFault {
            tick: self.tick,
            entity,
            script,
            hook,
            reason,
        };
        log::warn!("{}", fault);
        self.faults.push(fault);
    }

    pub fn is_empty(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn len(&self) -> usize {
        self.faults.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TickFault> {
        self.faults.iter()
    }

    pub fn into_vec(self) -> Vec<TickFault> {
        self.faults
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_message_from_str_and_string() {
        let r = std::panic::catch_unwind(|| panic!("boom"));
        assert_eq!(panic_message(r.unwrap_err().as_ref()), "boom");

        let r = std::panic::catch_unwind(|| panic!("code {}", 7));
        assert_eq!(panic_message(r.unwrap_err().as_ref()), "code 7");
    }

    #[test]
    fn record_stamps_tick() {
        let mut log = FaultLog::new(12);
        log.record(
            Some(EntityId(3)),
            Some(ScriptKind("ai")),
            Some(Hook::Update),
            FaultReason::Error("lost target".into()),
        );
        let fault = log.iter().next().unwrap();
        assert_eq!(fault.tick, 12);
        assert_eq!(
            fault.to_string(),
            "tick 12, entity 3, script ai, Update: error: lost target"
        );
    }
}
