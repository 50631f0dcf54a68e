//! # Registry Module
//!
//! The code deployed at a registry address. It implements the selector-table
//! administration interface itself and forwards every other selector to the
//! module the table names, running that module's code against the
//! registry's own storage.
//!
//! ## Dispatch order
//!
//! 1. The built-in interface below.
//! 2. The selector table.
//! 3. Otherwise [`RegistryError::UnrecognizedOperation`].
//!
//! ## Access control
//!
//! Every table mutation requires `caller == storage.admin`. Introspection is
//! open to any caller.

use crate::abi::{Function, ParamType, Token};
use crate::domain::selector_table::RouteChange;
use crate::domain::value_objects::{Address, Bytes, Selector};
use crate::errors::RegistryError;
use crate::events::RegistryEvent;
use crate::modules::decode_args;
use crate::ports::outbound::{find_function, CallFrame, Module};
use tracing::debug;

/// Default bound on the selectors carried by one table mutation.
pub const DEFAULT_MAX_SELECTORS: usize = 256;

// =============================================================================
// INTERFACE
// =============================================================================

const SELECTOR_ARRAY: ParamType = ParamType::Array(&ParamType::Bytes4);
const ADDRESS_ARRAY: ParamType = ParamType::Array(&ParamType::Address);

/// `addModule(address,bytes4[])`
pub const ADD_MODULE: Function = Function {
    name: "addModule",
    inputs: &[ParamType::Address, SELECTOR_ARRAY],
    outputs: &[],
};

/// `updateModule(address,address,bytes4[],bytes4[])`
pub const UPDATE_MODULE: Function = Function {
    name: "updateModule",
    inputs: &[
        ParamType::Address,
        ParamType::Address,
        SELECTOR_ARRAY,
        SELECTOR_ARRAY,
    ],
    outputs: &[],
};

/// `removeModule(address,bytes4[])`
pub const REMOVE_MODULE: Function = Function {
    name: "removeModule",
    inputs: &[ParamType::Address, SELECTOR_ARRAY],
    outputs: &[],
};

/// `admin()`
pub const ADMIN: Function = Function {
    name: "admin",
    inputs: &[],
    outputs: &[ParamType::Address],
};

/// `moduleAddress(bytes4)`; the zero address when unrouted.
pub const MODULE_ADDRESS: Function = Function {
    name: "moduleAddress",
    inputs: &[ParamType::Bytes4],
    outputs: &[ParamType::Address],
};

/// `moduleSelectors(address)`
pub const MODULE_SELECTORS: Function = Function {
    name: "moduleSelectors",
    inputs: &[ParamType::Address],
    outputs: &[SELECTOR_ARRAY],
};

/// `moduleAddresses()`
pub const MODULE_ADDRESSES: Function = Function {
    name: "moduleAddresses",
    inputs: &[],
    outputs: &[ADDRESS_ARRAY],
};

/// Built-in interface of every registry.
pub const INTERFACE: &[Function] = &[
    ADD_MODULE,
    UPDATE_MODULE,
    REMOVE_MODULE,
    ADMIN,
    MODULE_ADDRESS,
    MODULE_SELECTORS,
    MODULE_ADDRESSES,
];

// =============================================================================
// REGISTRY MODULE
// =============================================================================

/// Registry code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryModule {
    max_selectors: usize,
}

impl Default for RegistryModule {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SELECTORS)
    }
}

impl RegistryModule {
    /// Registry code accepting at most `max_selectors` per mutation.
    #[must_use]
    pub const fn new(max_selectors: usize) -> Self {
        Self { max_selectors }
    }

    /// Configured selector bound.
    #[must_use]
    pub const fn max_selectors(&self) -> usize {
        self.max_selectors
    }

    fn require_admin(frame: &CallFrame<'_>) -> Result<(), RegistryError> {
        if frame.caller != frame.storage.admin {
            return Err(RegistryError::Unauthorized {
                caller: frame.caller,
            });
        }
        Ok(())
    }

    fn check_selectors(&self, selectors: &[Selector]) -> Result<(), RegistryError> {
        if selectors.is_empty() {
            return Err(RegistryError::EmptySelectorSet);
        }
        self.check_bound(selectors)
    }

    fn check_bound(&self, selectors: &[Selector]) -> Result<(), RegistryError> {
        if selectors.len() > self.max_selectors {
            return Err(RegistryError::TooManySelectors {
                size: selectors.len(),
                max: self.max_selectors,
            });
        }
        Ok(())
    }

    /// A routing target must be a deployed account or the registry itself.
    fn check_target(frame: &CallFrame<'_>, module: Address) -> Result<(), RegistryError> {
        if module.is_zero() {
            return Err(RegistryError::ZeroAddress);
        }
        if module != frame.storage_address && frame.state().code_at(module).is_none() {
            return Err(RegistryError::NoCode(module));
        }
        Ok(())
    }

    fn add_module(&self, frame: &mut CallFrame<'_>, args: &[u8]) -> Result<Bytes, RegistryError> {
        Self::require_admin(frame)?;
        let [module, selectors] = decode_args(&ADD_MODULE, args)?;
        let module = module.into_address()?;
        let selectors = selectors.into_selectors()?;

        self.check_selectors(&selectors)?;
        Self::check_target(frame, module)?;

        frame.storage.routes.apply(&[RouteChange::Add {
            module,
            selectors: selectors.clone(),
        }])?;
        frame.emit(RegistryEvent::ModuleAdded { module, selectors });
        Ok(Bytes::new())
    }

    fn update_module(
        &self,
        frame: &mut CallFrame<'_>,
        args: &[u8],
    ) -> Result<Bytes, RegistryError> {
        Self::require_admin(frame)?;
        let [old_module, new_module, old_selectors, new_selectors] =
            decode_args(&UPDATE_MODULE, args)?;
        let old_module = old_module.into_address()?;
        let new_module = new_module.into_address()?;
        let old_selectors = old_selectors.into_selectors()?;
        let new_selectors = new_selectors.into_selectors()?;

        self.check_selectors(&old_selectors)?;
        self.check_bound(&new_selectors)?;
        Self::check_target(frame, new_module)?;

        frame.storage.routes.apply(&[
            RouteChange::Remove {
                module: old_module,
                selectors: old_selectors.clone(),
            },
            RouteChange::Add {
                module: new_module,
                selectors: new_selectors.clone(),
            },
        ])?;
        frame.emit(RegistryEvent::ModuleUpdated {
            old_module,
            new_module,
            old_selectors,
            new_selectors,
        });
        Ok(Bytes::new())
    }

    fn remove_module(
        &self,
        frame: &mut CallFrame<'_>,
        args: &[u8],
    ) -> Result<Bytes, RegistryError> {
        Self::require_admin(frame)?;
        let [module, selectors] = decode_args(&REMOVE_MODULE, args)?;
        let module = module.into_address()?;
        let selectors = selectors.into_selectors()?;

        self.check_selectors(&selectors)?;

        frame.storage.routes.apply(&[RouteChange::Remove {
            module,
            selectors: selectors.clone(),
        }])?;
        frame.emit(RegistryEvent::ModuleRemoved { module, selectors });
        Ok(Bytes::new())
    }

    fn introspect(
        frame: &CallFrame<'_>,
        function: &Function,
        args: &[u8],
    ) -> Result<Bytes, RegistryError> {
        let routes = &frame.storage.routes;
        let output = match function.name {
            "admin" => Token::Address(frame.storage.admin),
            "moduleAddress" => {
                let [selector] = decode_args(function, args)?;
                let module = routes.resolve(selector.into_selector()?);
                Token::Address(module.unwrap_or(Address::ZERO))
            }
            "moduleSelectors" => {
                let [module] = decode_args(function, args)?;
                Token::selectors(&routes.selectors_of(module.into_address()?))
            }
            _ => Token::Array(routes.modules().into_iter().map(Token::Address).collect()),
        };
        Ok(function.encode_output(&[output])?)
    }

    fn dispatch(
        frame: &mut CallFrame<'_>,
        selector: Selector,
        args: &[u8],
    ) -> Result<Bytes, RegistryError> {
        let target = frame
            .storage
            .routes
            .resolve(selector)
            .ok_or(RegistryError::UnrecognizedOperation(selector))?;
        let code = frame
            .state()
            .code_at(target)
            .ok_or(RegistryError::NoCode(target))?;
        if !code.implements(selector) {
            return Err(RegistryError::UnrecognizedOperation(selector));
        }

        debug!(
            %selector,
            module = ?target,
            code = code.name(),
            "Dispatching to module"
        );
        code.execute(&mut frame.delegate(target), selector, args)
    }
}

impl Module for RegistryModule {
    fn name(&self) -> &'static str {
        "registry"
    }

    fn interface(&self) -> &'static [Function] {
        INTERFACE
    }

    fn execute(
        &self,
        frame: &mut CallFrame<'_>,
        selector: Selector,
        args: &[u8],
    ) -> Result<Bytes, RegistryError> {
        let Some(function) = find_function(INTERFACE, selector) else {
            return Self::dispatch(frame, selector, args);
        };
        match function.name {
            "addModule" => self.add_module(frame, args),
            "updateModule" => self.update_module(frame, args),
            "removeModule" => self.remove_module(frame, args),
            _ => Self::introspect(frame, function, args),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
