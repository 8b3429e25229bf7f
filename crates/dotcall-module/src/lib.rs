//! Authoring kit for modules that `dotcall` can locate, load, and invoke.
//!
//! A dotcall module is a dynamic library that exports a [`ModuleDefinition`]:
//! an explicit registry of qualified type names, each with a default
//! constructor and a table of named methods. Every method carries descriptors
//! for its formal parameters, and each parameter knows how to bind itself from
//! JSON text. The host never needs runtime type metadata; it walks the
//! registry by name.
//!
//! # Architecture
//!
//! The host (`dotcall-cli`) opens the library, checks the exported
//! [`ABI_VERSION`], and calls the definition entry point emitted by
//! [`export_module!`]. Values cross the boundary as type-erased
//! [`Instance`] and [`Argument`] boxes, so a module must be compiled with the
//! same toolchain and the same version of this crate as the host.
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//!
//! use dotcall_module::{MethodDefinition, ModuleDefinition, TypeDefinition};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Order {
//!     quantity: u32,
//! }
//!
//! #[derive(Default)]
//! struct Warehouse {
//!     shipped: u32,
//! }
//!
//! impl Warehouse {
//!     fn ship(&mut self, order: Order) -> Result<u32, Infallible> {
//!         self.shipped += order.quantity;
//!         Ok(self.shipped)
//!     }
//! }
//!
//! let module = ModuleDefinition::builder("Inventory")
//!     .with_type(
//!         TypeDefinition::new::<Warehouse>("Stock.Warehouse")
//!             .method(MethodDefinition::unary("Ship", "order", Warehouse::ship)),
//!     )
//!     .build()
//!     .expect("definition is valid");
//!
//! let warehouse = module.find_type("Stock.Warehouse").expect("type exists");
//! let ship = warehouse.find_method("Ship").expect("method exists");
//! assert_eq!(ship.arity(), 1);
//! ```

pub mod binding;
pub mod definition;
pub mod error;
pub mod method;

pub use self::binding::{bind_payload, bind_value};
pub use self::definition::{ModuleBuilder, ModuleDefinition, TypeDefinition};
pub use self::error::{BindError, DefinitionError, InvokeError, MethodFailure};
pub use self::method::{Argument, Instance, MethodDefinition, ParameterDefinition};

/// Revision of the host/module contract. Bumped whenever the layout of the
/// exported definition changes.
pub const ABI_VERSION: u32 = 1;

/// Name of the exported `u32` static holding the module's [`ABI_VERSION`].
pub const ABI_VERSION_SYMBOL: &[u8] = b"DOTCALL_ABI_VERSION\0";

/// Name of the exported definition entry point.
pub const DEFINITION_SYMBOL: &[u8] = b"dotcall_module_definition\0";

/// Signature of the entry point emitted by [`export_module!`].
pub type DefinitionEntryPoint = fn() -> Result<ModuleDefinition, DefinitionError>;

/// Exports a module definition function under the symbols the host expects.
///
/// The argument is a path to a function returning
/// `Result<ModuleDefinition, DefinitionError>`.
///
/// ```ignore
/// fn definition() -> Result<ModuleDefinition, DefinitionError> {
///     ModuleDefinition::builder("SampleLib").build()
/// }
///
/// dotcall_module::export_module!(definition);
/// ```
#[macro_export]
macro_rules! export_module {
    ($definition:path) => {
        /// ABI revision this module was compiled against.
        #[unsafe(no_mangle)]
        pub static DOTCALL_ABI_VERSION: u32 = $crate::ABI_VERSION;

        /// Returns the registry of types exported by this module.
        ///
        /// # Errors
        ///
        /// Propagates the definition's validation failure.
        #[unsafe(no_mangle)]
        pub fn dotcall_module_definition()
        -> ::core::result::Result<$crate::ModuleDefinition, $crate::DefinitionError> {
            $definition()
        }
    };
}
