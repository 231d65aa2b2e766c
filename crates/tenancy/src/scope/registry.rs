//! Scope rule registration and lookup.
//!
//! Registration is a two-phase affair. A [`ScopeRegistryBuilder`] wraps the
//! host [`Mapper`] while entity types are being defined: it records scope
//! rules, declares the tenant reference, forwards index and uniqueness
//! declarations with the tenant field added, and re-applies a parent's rule
//! whenever the host announces a new subtype. [`ScopeRegistryBuilder::build`]
//! then freezes everything into a [`ScopeRegistry`], which is immutable and
//! safe to share across threads for the lifetime of the process.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use super::augment::{augment_index, augment_uniqueness};
use super::collection::ScopedCollection;
use super::query::{Criteria, tenant_filter};
use super::rule::{ScopeOptions, ScopeRule};
use super::validator::validate_tenant;
use super::write::stamp_tenant;
use crate::core::{DocumentStore, Mapper};
use crate::error::{
    ConfigurationError, ScopeResult, TenantNotSetError, ValidationErrors,
};
use crate::tenant::TenantContext;
use crate::types::{Filter, IndexSpec, TenantOwned, UniquenessValidator};

/// Registration-time decorator around a host [`Mapper`].
///
/// # Example
///
/// ```
/// use helios_tenancy::backends::memory::InMemoryStore;
/// use helios_tenancy::scope::{ScopeOptions, ScopeRegistryBuilder};
/// use helios_tenancy::types::{IndexSpec, UniquenessValidator};
///
/// let store = InMemoryStore::new();
/// let mut builder = ScopeRegistryBuilder::new(&store);
///
/// builder
///     .register_tenant_scope("Invoice", "account", ScopeOptions::new().force_tenant())
///     .unwrap();
/// builder.index("Invoice", IndexSpec::ascending("number")).unwrap();
/// builder
///     .validates_uniqueness("Invoice", UniquenessValidator::new("number"))
///     .unwrap();
///
/// // The host announces a subtype; it inherits the rule.
/// builder.register_subtype("Invoice", "CreditNote").unwrap();
///
/// let registry = builder.build();
/// assert_eq!(registry.tenant_field("CreditNote"), Some("account_id"));
/// assert_eq!(
///     store.indexes("Invoice")[0].fields().collect::<Vec<_>>(),
///     vec!["account_id", "number"]
/// );
/// ```
pub struct ScopeRegistryBuilder<'m> {
    mapper: &'m dyn Mapper,
    association_pattern: Option<Regex>,
    rules: HashMap<String, Arc<ScopeRule>>,
    parents: HashMap<String, String>,
}

impl<'m> ScopeRegistryBuilder<'m> {
    /// Creates a builder that forwards declarations to `mapper`.
    pub fn new(mapper: &'m dyn Mapper) -> Self {
        Self {
            mapper,
            association_pattern: None,
            rules: HashMap::new(),
            parents: HashMap::new(),
        }
    }

    /// Restricts association names to `pattern` instead of plain identifiers.
    pub fn with_association_pattern(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.association_pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    /// Makes `entity_type` tenant-aware.
    ///
    /// Declares the reference to the tenant type named by `association`,
    /// derives the tenant field from the mapper's foreign-key convention and
    /// records the rule that drives query scoping, stamping and validation.
    /// With `options.index`, a background index on the tenant field is created.
    ///
    /// A type that only carries an inherited rule may be registered explicitly
    /// to override it. Subtypes that inherited from it are refreshed with the
    /// new registration, recursively; subtypes with explicit rules keep theirs.
    ///
    /// Nothing is recorded unless every mapper call succeeds, so a failed
    /// registration can be retried.
    ///
    /// # Errors
    ///
    /// * `ConfigurationError::AlreadyScoped` - If the type was registered explicitly before
    /// * `ConfigurationError::InvalidAssociation` - If the association name is not usable
    /// * `ScopeError::Mapper` - If the mapper rejects the reference or index
    pub fn register_tenant_scope(
        &mut self,
        entity_type: &str,
        association: &str,
        options: ScopeOptions,
    ) -> ScopeResult<Arc<ScopeRule>> {
        if let Some(existing) = self.rules.get(entity_type) {
            match existing.inherited_from() {
                Some(parent) => tracing::warn!(
                    entity_type = %entity_type,
                    parent = %parent,
                    "Overriding inherited tenant scope"
                ),
                None => {
                    return Err(ConfigurationError::AlreadyScoped {
                        entity_type: entity_type.to_string(),
                    }
                    .into());
                }
            }
        }
        self.apply(entity_type, association, options, None)
    }

    /// Notifies the builder that `child` was introduced as a subtype of `parent`.
    ///
    /// If `parent` is tenant-aware and `child` has no rule of its own, `child`
    /// receives the same registration (same association and options). Because
    /// the child is then tenant-aware itself, its own subtypes inherit in turn.
    ///
    /// Returns the child's rule, if it has one.
    ///
    /// # Errors
    ///
    /// * `ConfigurationError::SelfInheritance` - If `child` is `parent` or one of its ancestors
    /// * `ConfigurationError::DuplicateSubtype` - If `child` already has a parent
    /// * `ScopeError::Mapper` - If the mapper rejects the inherited declarations
    pub fn register_subtype(
        &mut self,
        parent: &str,
        child: &str,
    ) -> ScopeResult<Option<Arc<ScopeRule>>> {
        let mut ancestor = Some(parent);
        while let Some(current) = ancestor {
            if current == child {
                return Err(ConfigurationError::SelfInheritance {
                    entity_type: child.to_string(),
                }
                .into());
            }
            ancestor = self.parents.get(current).map(String::as_str);
        }
        if self.parents.contains_key(child) {
            return Err(ConfigurationError::DuplicateSubtype {
                entity_type: child.to_string(),
            }
            .into());
        }

        let inherited = if let Some(existing) = self.rules.get(child) {
            Some(Arc::clone(existing))
        } else if let Some(rule) = self.rules.get(parent).cloned() {
            tracing::debug!(
                parent = %parent,
                child = %child,
                "Propagating tenant scope to subtype"
            );
            Some(self.apply(
                child,
                rule.association(),
                *rule.options(),
                Some(parent.to_string()),
            )?)
        } else {
            None
        };
        self.parents.insert(child.to_string(), parent.to_string());
        Ok(inherited)
    }

    /// Declares an index, leading with the tenant field when the type uses full indexes.
    ///
    /// Returns the spec that was handed to the mapper.
    pub fn index(&self, entity_type: &str, spec: IndexSpec) -> ScopeResult<IndexSpec> {
        self.forward_index(entity_type, self.rule(entity_type), spec)
    }

    /// Declares a uniqueness validator, scoped per tenant on tenant-aware types.
    ///
    /// Returns the validator that was handed to the mapper.
    pub fn validates_uniqueness(
        &self,
        entity_type: &str,
        validator: UniquenessValidator,
    ) -> ScopeResult<UniquenessValidator> {
        let validator = match self.rules.get(entity_type) {
            Some(rule) => augment_uniqueness(rule, validator),
            None => validator,
        };
        tracing::debug!(
            entity_type = %entity_type,
            fields = ?validator.fields,
            scope = ?validator.scope,
            "Registering uniqueness validator"
        );
        self.mapper.register_uniqueness(entity_type, &validator)?;
        Ok(validator)
    }

    /// Returns the rule registered so far for `entity_type`.
    pub fn rule(&self, entity_type: &str) -> Option<&ScopeRule> {
        self.rules.get(entity_type).map(Arc::as_ref)
    }

    /// Freezes the registrations.
    pub fn build(self) -> ScopeRegistry {
        ScopeRegistry {
            rules: self.rules,
            parents: self.parents,
        }
    }

    /// Builds the rule for `entity_type` and records it once every mapper call
    /// has succeeded, then refreshes subtypes that inherited the previous rule.
    fn apply(
        &mut self,
        entity_type: &str,
        association: &str,
        options: ScopeOptions,
        inherited_from: Option<String>,
    ) -> ScopeResult<Arc<ScopeRule>> {
        self.check_association(association)?;

        let rule = ScopeRule {
            entity_type: entity_type.to_string(),
            association: association.to_string(),
            tenant_field: self.mapper.foreign_key(association),
            options,
            inherited_from,
        };

        let declared = self
            .rules
            .get(entity_type)
            .is_some_and(|previous| previous.tenant_field() == rule.tenant_field());
        if !declared {
            self.mapper
                .declare_reference(entity_type, association, rule.tenant_field())?;
        }
        if options.index {
            let spec = IndexSpec::ascending(rule.tenant_field()).background();
            self.forward_index(entity_type, Some(&rule), spec)?;
        }

        let rule = Arc::new(rule);
        self.rules.insert(entity_type.to_string(), Arc::clone(&rule));

        tracing::debug!(
            entity_type = %entity_type,
            tenant_field = %rule.tenant_field(),
            optional = options.optional,
            force_tenant = options.force_tenant,
            "Registered tenant scope"
        );

        self.propagate(entity_type, &rule)?;
        Ok(rule)
    }

    /// Re-applies `rule` to the direct subtypes of `parent` that still carry
    /// a rule inherited from it. Subtypes with explicit rules are left alone.
    fn propagate(&mut self, parent: &str, rule: &ScopeRule) -> ScopeResult<()> {
        let inheriting: Vec<String> = self
            .parents
            .iter()
            .filter(|(child, p)| {
                p.as_str() == parent
                    && self
                        .rules
                        .get(child.as_str())
                        .is_some_and(|r| r.inherited_from() == Some(parent))
            })
            .map(|(child, _)| child.clone())
            .collect();

        for child in inheriting {
            tracing::debug!(
                parent = %parent,
                child = %child,
                "Refreshing inherited tenant scope"
            );
            self.apply(
                &child,
                rule.association(),
                *rule.options(),
                Some(parent.to_string()),
            )?;
        }
        Ok(())
    }

    fn forward_index(
        &self,
        entity_type: &str,
        rule: Option<&ScopeRule>,
        spec: IndexSpec,
    ) -> ScopeResult<IndexSpec> {
        let spec = match rule {
            Some(rule) => augment_index(rule, spec),
            None => spec,
        };
        tracing::debug!(entity_type = %entity_type, index = %spec, "Creating index");
        self.mapper.create_index(entity_type, &spec)?;
        Ok(spec)
    }

    fn check_association(&self, association: &str) -> Result<(), ConfigurationError> {
        let valid = match &self.association_pattern {
            Some(pattern) => pattern.is_match(association),
            None => is_identifier(association),
        };
        if valid {
            Ok(())
        } else {
            Err(ConfigurationError::InvalidAssociation {
                association: association.to_string(),
            })
        }
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// The frozen set of scope rules.
///
/// Holds exactly one rule per tenant-aware entity type. Every accessor reads
/// the ambient [`TenantContext`] at call time unless a context is passed
/// explicitly (`*_with` variants).
#[derive(Debug, Clone, Default)]
pub struct ScopeRegistry {
    rules: HashMap<String, Arc<ScopeRule>>,
    parents: HashMap<String, String>,
}

impl ScopeRegistry {
    /// Returns the rule for `entity_type`.
    pub fn rule(&self, entity_type: &str) -> Option<&ScopeRule> {
        self.rules.get(entity_type).map(Arc::as_ref)
    }

    /// Returns `true` if `entity_type` is tenant-aware.
    pub fn is_tenant_aware(&self, entity_type: &str) -> bool {
        self.rules.contains_key(entity_type)
    }

    /// Returns the tenant field of `entity_type`.
    pub fn tenant_field(&self, entity_type: &str) -> Option<&str> {
        self.rule(entity_type).map(ScopeRule::tenant_field)
    }

    /// Returns the registered parent of `entity_type`.
    pub fn parent_of(&self, entity_type: &str) -> Option<&str> {
        self.parents.get(entity_type).map(String::as_str)
    }

    /// Returns every tenant-aware entity type.
    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Returns the default filter of `entity_type` under `ctx`.
    ///
    /// Types that are not tenant-aware are never filtered.
    pub fn default_filter(
        &self,
        entity_type: &str,
        ctx: &TenantContext,
    ) -> Result<Filter, TenantNotSetError> {
        match self.rule(entity_type) {
            Some(rule) => tenant_filter(rule, ctx),
            None => Ok(Filter::All),
        }
    }

    /// ANDs the default filter of `entity_type` into `filter` under the ambient context.
    pub fn scoped_filter(&self, entity_type: &str, filter: Filter) -> ScopeResult<Filter> {
        self.criteria(entity_type).filter(filter).resolve()
    }

    /// Starts a query against `entity_type`.
    pub fn criteria(&self, entity_type: &str) -> Criteria<'_> {
        Criteria::new(self, entity_type)
    }

    /// Runs the before-validation hook under the ambient context.
    pub fn before_validation<D>(&self, entity_type: &str, instance: &mut D) -> bool
    where
        D: TenantOwned + ?Sized,
    {
        self.before_validation_with(entity_type, instance, &TenantContext::ambient())
    }

    /// Runs the before-validation hook under `ctx`.
    pub fn before_validation_with<D>(
        &self,
        entity_type: &str,
        instance: &mut D,
        ctx: &TenantContext,
    ) -> bool
    where
        D: TenantOwned + ?Sized,
    {
        match self.rule(entity_type) {
            Some(rule) => stamp_tenant(rule, instance, ctx),
            None => false,
        }
    }

    /// Validates the tenant reference under the ambient context.
    pub fn validate<D>(&self, entity_type: &str, instance: &D) -> Result<(), ValidationErrors>
    where
        D: TenantOwned + ?Sized,
    {
        self.validate_with(entity_type, instance, &TenantContext::ambient())
    }

    /// Validates the tenant reference under `ctx`.
    pub fn validate_with<D>(
        &self,
        entity_type: &str,
        instance: &D,
        ctx: &TenantContext,
    ) -> Result<(), ValidationErrors>
    where
        D: TenantOwned + ?Sized,
    {
        let Some(rule) = self.rule(entity_type) else {
            return Ok(());
        };
        let errors = validate_tenant(rule, instance, ctx);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors {
                entity_type: entity_type.to_string(),
                errors,
            })
        }
    }

    /// Stamps, then validates, under a single snapshot of the ambient context.
    pub fn prepare_write<D>(&self, entity_type: &str, instance: &mut D) -> Result<(), ValidationErrors>
    where
        D: TenantOwned + ?Sized,
    {
        let ctx = TenantContext::ambient();
        self.before_validation_with(entity_type, instance, &ctx);
        self.validate_with(entity_type, instance, &ctx)
    }

    /// Returns a tenant-scoped view of `entity_type` in `store`.
    pub fn collection<'a, S>(&'a self, store: &'a S, entity_type: &str) -> ScopedCollection<'a, S>
    where
        S: DocumentStore + ?Sized,
    {
        ScopedCollection::new(self, store, entity_type)
    }
}
