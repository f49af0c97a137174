//! Execution context handed from view to view: the request engine plus the
//! shared environment.

use std::rc::Rc;

use crate::core::env::Environment;
use crate::engine::RequestEngine;

#[derive(Clone)]
pub struct Context {
    engine: Rc<dyn RequestEngine>,
    env: Environment,
}

impl Context {
    pub fn new(engine: Rc<dyn RequestEngine>) -> Self {
        Self {
            engine,
            env: Environment::new(),
        }
    }

    /// A context sharing this engine but bound to `env`.
    pub fn with_environment(&self, env: Environment) -> Self {
        Self {
            engine: Rc::clone(&self.engine),
            env,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn engine(&self) -> &dyn RequestEngine {
        self.engine.as_ref()
    }
}
