use std::fmt;

use super::Structure;
use crate::factories::FactoryRegistry;
use crate::ids::{CityId, FactoryId, StructureId};

/// What a structure belongs to. Never both a city and a factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Binding {
    #[default]
    None,
    City(CityId),
    Factory(FactoryId),
}

/// A bind call that would leave a structure tied to a city and a factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingConflict {
    pub structure: StructureId,
    pub existing: Binding,
    pub requested: Binding,
}

impl fmt::Display for BindingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "structure {} is bound to {:?}, cannot bind to {:?}",
            self.structure.0, self.existing, self.requested
        )
    }
}

impl std::error::Error for BindingConflict {}

impl Structure {
    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn is_factory(&self) -> bool {
        matches!(self.binding, Binding::Factory(_))
    }

    /// Binds to `factory`, or clears an existing factory binding on `None`.
    pub fn bind_factory(&mut self, factory: Option<FactoryId>) -> Result<(), BindingConflict> {
        match (factory, self.binding) {
            (Some(f), Binding::City(_)) => Err(BindingConflict {
                structure: self.id,
                existing: self.binding,
                requested: Binding::Factory(f),
            }),
            (Some(f), _) => {
                self.binding = Binding::Factory(f);
                Ok(())
            }
            (None, Binding::Factory(_)) => {
                self.binding = Binding::None;
                Ok(())
            }
            (None, _) => Ok(()),
        }
    }

    /// Binds to `city`, or clears the city on `None`. Clearing is a no-op on
    /// a factory-bound structure so repeated detach calls stay harmless.
    pub fn bind_city(&mut self, city: Option<CityId>) -> Result<(), BindingConflict> {
        match (city, self.binding) {
            (None, Binding::Factory(_)) => Ok(()),
            (Some(c), Binding::Factory(_)) => Err(BindingConflict {
                structure: self.id,
                existing: self.binding,
                requested: Binding::City(c),
            }),
            (city, _) => {
                self.binding = city.map_or(Binding::None, Binding::City);
                Ok(())
            }
        }
    }

    /// The city this structure counts towards, directly or via its factory.
    pub fn city(&self, factories: &FactoryRegistry) -> Option<CityId> {
        match self.binding {
            Binding::City(c) => Some(c),
            Binding::Factory(f) => factories.get(f).and_then(|f| f.city),
            Binding::None => None,
        }
    }
}
