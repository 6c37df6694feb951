//! Manifest handler registry.
//!
//! Handlers check individual manifest keys once an application descriptor
//! exists. The registry decides which handlers apply to a given manifest,
//! runs them in registration order and gathers their warnings.

use super::{ApplicationDescriptor, InstallWarning};

/// Validation collaborator invoked exactly once per assembled application.
///
/// # Examples
///
/// ```
/// use appkg::application::{HandlerRegistry, ManifestHandlerRegistry};
///
/// let registry = HandlerRegistry::with_builtin_handlers();
/// let _: &dyn ManifestHandlerRegistry = &registry;
/// ```
#[cfg_attr(test, mockall::automock)]
pub trait ManifestHandlerRegistry: Send + Sync {
    /// Validate `descriptor`, returning any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns a human-readable message when the manifest is unacceptable.
    fn validate(&self, descriptor: &ApplicationDescriptor) -> Result<Vec<InstallWarning>, String>;
}

/// A validator for one or more manifest keys.
pub trait ManifestHandler: Send + Sync {
    /// Manifest keys (dotted paths) this handler is interested in.
    fn keys(&self) -> &[&'static str];

    /// Whether the handler runs even when none of its keys are present.
    fn always_validate(&self) -> bool {
        false
    }

    /// Check the descriptor, pushing warnings into `warnings`.
    ///
    /// # Errors
    ///
    /// Returns a message describing why the manifest is unacceptable.
    fn validate(
        &self,
        descriptor: &ApplicationDescriptor,
        warnings: &mut Vec<InstallWarning>,
    ) -> Result<(), String>;
}

/// Ordered collection of [`ManifestHandler`]s.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: Vec<Box<dyn ManifestHandler>>,
}

impl HandlerRegistry {
    /// Create a registry with no handlers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding [`NameHandler`] and [`VersionHandler`].
    #[must_use]
    pub fn with_builtin_handlers() -> Self {
        let mut registry = Self::new();
        registry.register(NameHandler);
        registry.register(VersionHandler);
        registry
    }

    /// Append a handler; handlers run in registration order.
    pub fn register(&mut self, handler: impl ManifestHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Report whether no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    fn applies(handler: &dyn ManifestHandler, descriptor: &ApplicationDescriptor) -> bool {
        handler.always_validate()
            || handler
                .keys()
                .iter()
                .any(|key| descriptor.manifest().contains_key(key))
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

impl ManifestHandlerRegistry for HandlerRegistry {
    fn validate(&self, descriptor: &ApplicationDescriptor) -> Result<Vec<InstallWarning>, String> {
        let mut warnings = Vec::new();
        for handler in &self.handlers {
            if Self::applies(handler.as_ref(), descriptor) {
                handler.validate(descriptor, &mut warnings)?;
            }
        }
        Ok(warnings)
    }
}

/// Requires a non-empty string `name`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameHandler;

impl ManifestHandler for NameHandler {
    fn keys(&self) -> &[&'static str] {
        &["name"]
    }

    fn always_validate(&self) -> bool {
        true
    }

    fn validate(
        &self,
        descriptor: &ApplicationDescriptor,
        _warnings: &mut Vec<InstallWarning>,
    ) -> Result<(), String> {
        match descriptor.manifest().get("name") {
            None => Err("manifest has no `name`".to_owned()),
            Some(value) => match value.as_str() {
                Some(name) if !name.trim().is_empty() => Ok(()),
                Some(_) => Err("manifest `name` is empty".to_owned()),
                None => Err("manifest `name` must be a string".to_owned()),
            },
        }
    }
}

/// Warns about an absent or malformed `version`.
///
/// Valid versions are one to four dot-separated runs of ASCII digits,
/// e.g. `1`, `1.0` or `2.3.4.5`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VersionHandler;

impl VersionHandler {
    const MAX_PARTS: usize = 4;

    fn is_valid_version(version: &str) -> bool {
        let parts: Vec<&str> = version.split('.').collect();
        parts.len() <= Self::MAX_PARTS
            && parts
                .iter()
                .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
    }
}

impl ManifestHandler for VersionHandler {
    fn keys(&self) -> &[&'static str] {
        &["version"]
    }

    // Runs unconditionally so an absent version is reported too.
    fn always_validate(&self) -> bool {
        true
    }

    fn validate(
        &self,
        descriptor: &ApplicationDescriptor,
        warnings: &mut Vec<InstallWarning>,
    ) -> Result<(), String> {
        match descriptor.manifest().get("version") {
            None => warnings.push(InstallWarning::for_key(
                "manifest has no `version`",
                "version",
            )),
            Some(value) => match value.as_str() {
                Some(version) if Self::is_valid_version(version) => {}
                _ => warnings.push(InstallWarning::for_key(
                    format!("`version` {value} is not 1-4 dot-separated integers"),
                    "version",
                )),
            },
        }
        Ok(())
    }
}
