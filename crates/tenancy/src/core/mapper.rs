//! Host mapper configuration surface.

use crate::error::MapperError;
use crate::types::{IndexSpec, UniquenessValidator};

/// The configuration entry points the engine decorates.
///
/// A host document mapper implements this trait so the engine can declare the
/// tenant reference and forward (augmented) index and uniqueness declarations.
/// The engine calls these methods only during registration, from a
/// [`ScopeRegistryBuilder`](crate::scope::ScopeRegistryBuilder).
///
/// # Example: Wrapping a Host Mapper
///
/// ```ignore
/// use helios_tenancy::core::Mapper;
/// use helios_tenancy::error::MapperError;
/// use helios_tenancy::types::{IndexSpec, UniquenessValidator};
///
/// struct MyMapper { /* schema handle */ }
///
/// impl Mapper for MyMapper {
///     fn declare_reference(&self, entity_type: &str, association: &str, field: &str)
///         -> Result<(), MapperError>
///     {
///         // add a `belongs_to` relation stored in `field`
///         todo!()
///     }
///
///     fn create_index(&self, entity_type: &str, index: &IndexSpec) -> Result<(), MapperError> {
///         todo!()
///     }
///
///     fn register_uniqueness(&self, entity_type: &str, validator: &UniquenessValidator)
///         -> Result<(), MapperError>
///     {
///         todo!()
///     }
/// }
/// ```
pub trait Mapper: Send + Sync {
    /// Returns the storage field name for a reference named `association`.
    ///
    /// The default follows the `<association>_id` foreign-key convention.
    fn foreign_key(&self, association: &str) -> String {
        format!("{}_id", association)
    }

    /// Declares a reference from `entity_type` to the tenant type named by
    /// `association`, stored in `field`.
    fn declare_reference(
        &self,
        entity_type: &str,
        association: &str,
        field: &str,
    ) -> Result<(), MapperError>;

    /// Creates an index on `entity_type`.
    fn create_index(&self, entity_type: &str, index: &IndexSpec) -> Result<(), MapperError>;

    /// Registers a uniqueness validator on `entity_type`.
    fn register_uniqueness(
        &self,
        entity_type: &str,
        validator: &UniquenessValidator,
    ) -> Result<(), MapperError>;
}
