//! String-keyed factories for every pluggable module.
//!
//! Methods and Fock builders receive a [`ModuleContext`] when they are
//! created, which lets them create the modules they depend on by key.

use crate::config::ModuleOptions;
use crate::error::{Result, ScfError};
use crate::fock::{BasicFockBuild, FockBuilder};
use crate::guess::CoreGuess;
use crate::iterate::ScfIterate;
use crate::method::EnergyMethod;
use basis::integrals::{
    CoreHamiltonian, DipoleComponent, NuclearAttraction, NuclearDipole, NuclearRepulsion,
    OneElectronIntegral, OsDipole, OsKineticEnergy, OsOverlap, ReferenceEri, SystemIntegral,
    TwoElectronIntegral,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type OneElectronFactory = Box<dyn Fn() -> Box<dyn OneElectronIntegral> + Send + Sync>;
type TwoElectronFactory = Box<dyn Fn() -> Box<dyn TwoElectronIntegral> + Send + Sync>;
type SystemFactory = Box<dyn Fn() -> Box<dyn SystemIntegral> + Send + Sync>;
type FockFactory = Box<dyn Fn(&ModuleContext) -> Box<dyn FockBuilder> + Send + Sync>;
type MethodFactory = Box<dyn Fn(&ModuleContext) -> Box<dyn EnergyMethod> + Send + Sync>;

#[derive(Default)]
pub struct ModuleRegistry {
    one_electron: HashMap<String, OneElectronFactory>,
    two_electron: HashMap<String, TwoElectronFactory>,
    system: HashMap<String, SystemFactory>,
    fock: HashMap<String, FockFactory>,
    methods: HashMap<String, MethodFactory>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every module shipped with the crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_one_electron("OSOverlap", || Box::new(OsOverlap::new()));
        registry.register_one_electron("OSKineticEnergy", || Box::new(OsKineticEnergy::new()));
        registry.register_one_electron("NuclearAttraction", || Box::new(NuclearAttraction::new()));
        registry.register_one_electron("CoreHamiltonian", || Box::new(CoreHamiltonian::new()));
        registry.register_one_electron("Dipole_x", || Box::new(OsDipole::new(DipoleComponent::X)));
        registry.register_one_electron("Dipole_y", || Box::new(OsDipole::new(DipoleComponent::Y)));
        registry.register_one_electron("Dipole_z", || Box::new(OsDipole::new(DipoleComponent::Z)));
        registry.register_two_electron("ReferenceERI", || Box::new(ReferenceEri::new()));
        registry.register_system("NuclearRepulsion", || Box::new(NuclearRepulsion::new()));
        registry.register_system("NuclearDipole", || Box::new(NuclearDipole::new()));
        registry.register_fock_builder("BasicFockBuild", |ctx| {
            Box::new(BasicFockBuild::new(ctx.clone()))
        });
        registry.register_method("CoreGuess", |ctx| Box::new(CoreGuess::new(ctx.clone())));
        registry.register_method("SCF", |ctx| Box::new(ScfIterate::new(ctx.clone())));
        registry
    }

    pub fn register_one_electron<F>(&mut self, key: &str, factory: F)
    where
        F: Fn() -> Box<dyn OneElectronIntegral> + Send + Sync + 'static,
    {
        self.one_electron.insert(key.to_string(), Box::new(factory));
    }

    pub fn register_two_electron<F>(&mut self, key: &str, factory: F)
    where
        F: Fn() -> Box<dyn TwoElectronIntegral> + Send + Sync + 'static,
    {
        self.two_electron.insert(key.to_string(), Box::new(factory));
    }

    pub fn register_system<F>(&mut self, key: &str, factory: F)
    where
        F: Fn() -> Box<dyn SystemIntegral> + Send + Sync + 'static,
    {
        self.system.insert(key.to_string(), Box::new(factory));
    }

    pub fn register_fock_builder<F>(&mut self, key: &str, factory: F)
    where
        F: Fn(&ModuleContext) -> Box<dyn FockBuilder> + Send + Sync + 'static,
    {
        self.fock.insert(key.to_string(), Box::new(factory));
    }

    pub fn register_method<F>(&mut self, key: &str, factory: F)
    where
        F: Fn(&ModuleContext) -> Box<dyn EnergyMethod> + Send + Sync + 'static,
    {
        self.methods.insert(key.to_string(), Box::new(factory));
    }

    pub fn has_method(&self, key: &str) -> bool {
        self.methods.contains_key(key)
    }

    /// Registered method keys, sorted.
    pub fn method_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

fn unknown(kind: &'static str, key: &str) -> ScfError {
    ScfError::UnknownModule {
        kind,
        key: key.to_string(),
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("one_electron", &self.one_electron.keys().collect::<Vec<_>>())
            .field("two_electron", &self.two_electron.keys().collect::<Vec<_>>())
            .field("system", &self.system.keys().collect::<Vec<_>>())
            .field("fock", &self.fock.keys().collect::<Vec<_>>())
            .field("methods", &self.method_keys())
            .finish()
    }
}

/// A shared registry together with the options of one calculation.
#[derive(Debug, Clone)]
pub struct ModuleContext {
    registry: Arc<ModuleRegistry>,
    options: ModuleOptions,
}

impl Default for ModuleContext {
    fn default() -> Self {
        Self::new(Arc::new(ModuleRegistry::with_defaults()), ModuleOptions::default())
    }
}

impl ModuleContext {
    pub fn new(registry: Arc<ModuleRegistry>, options: ModuleOptions) -> Self {
        Self { registry, options }
    }

    pub fn with_options(&self, options: ModuleOptions) -> Self {
        Self::new(self.registry.clone(), options)
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ModuleOptions {
        &self.options
    }

    pub fn one_electron(&self, key: &str) -> Result<Box<dyn OneElectronIntegral>> {
        let factory = self
            .registry
            .one_electron
            .get(key)
            .ok_or_else(|| unknown("one-electron integral", key))?;
        Ok(factory())
    }

    pub fn two_electron(&self, key: &str) -> Result<Box<dyn TwoElectronIntegral>> {
        let factory = self
            .registry
            .two_electron
            .get(key)
            .ok_or_else(|| unknown("two-electron integral", key))?;
        Ok(factory())
    }

    pub fn system_integral(&self, key: &str) -> Result<Box<dyn SystemIntegral>> {
        let factory = self
            .registry
            .system
            .get(key)
            .ok_or_else(|| unknown("system integral", key))?;
        Ok(factory())
    }

    pub fn fock_builder(&self, key: &str) -> Result<Box<dyn FockBuilder>> {
        let factory = self
            .registry
            .fock
            .get(key)
            .ok_or_else(|| unknown("Fock builder", key))?;
        Ok(factory(self))
    }

    pub fn method(&self, key: &str) -> Result<Box<dyn EnergyMethod>> {
        let factory = self
            .registry
            .methods
            .get(key)
            .ok_or_else(|| unknown("energy method", key))?;
        Ok(factory(self))
    }
}
