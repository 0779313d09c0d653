//! Shared fixtures for unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use zeroize::Zeroizing;

use crate::core::cluster::{ClusterKeyFetch, ContextResolver};
use crate::core::domain::ClusterReference;
use crate::error::{ClusterError, Result};

pub const TEST_KEY: &str = "AGE-SECRET-KEY-13ZLWP4WFHQ6VHC2J5YYEUCFKGLZTD3SXQQPEGK3WU2M8FKYC238S7ZKNSV";
pub const TEST_PUBLIC_KEY: &str = "age1qnswq576pku84s2wyw4kr59ywvvdzua6crtdz0sf0l9udnje6c5snqfc2d";

/// Cluster fetch returning a fixed value and counting calls.
#[derive(Clone)]
pub struct CountingFetch {
    pub value: Rc<RefCell<Option<String>>>,
    pub calls: Rc<Cell<usize>>,
}

impl CountingFetch {
    pub fn returning(value: &str) -> Self {
        Self {
            value: Rc::new(RefCell::new(Some(value.to_string()))),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn failing() -> Self {
        Self {
            value: Rc::new(RefCell::new(None)),
            calls: Rc::new(Cell::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ClusterKeyFetch for CountingFetch {
    fn fetch(&self, _context: &str, reference: &ClusterReference) -> Result<Zeroizing<String>> {
        self.calls.set(self.calls.get() + 1);
        match self.value.borrow().as_deref() {
            Some(value) => Ok(Zeroizing::new(value.to_string())),
            None => Err(ClusterError::CommandFailed {
                command: format!("get secret {}", reference.secret_name),
                stderr: "connection refused".into(),
            }
            .into()),
        }
    }
}

/// Resolver with a fixed answer.
pub struct FixedResolver(pub Option<&'static str>);

impl ContextResolver for FixedResolver {
    fn current_context(&self) -> Result<String> {
        self.0
            .map(str::to_string)
            .ok_or_else(|| ClusterError::InvalidResponse("no current context".into()).into())
    }
}
