use crate::ecs::Component;
use crate::scene::{MaterialProperties, ModuleDescriptor};

/// Read-only metadata copied from a descriptor onto its instance
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleInfo {
    pub descriptor_id: String,
    pub module_type: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
    pub currency: Option<String>,
    pub asset_path: String,
    pub interactive: bool,
    pub material: Option<MaterialProperties>,
}

impl ModuleInfo {
    pub fn from_descriptor(descriptor: &ModuleDescriptor) -> Self {
        Self {
            descriptor_id: descriptor.id.clone(),
            module_type: descriptor.module_type.clone(),
            description: descriptor.description.clone(),
            image: descriptor.image.clone(),
            price: descriptor.price,
            currency: descriptor.currency.clone(),
            asset_path: descriptor.asset_path.clone(),
            interactive: descriptor.interactive,
            material: descriptor.material_properties,
        }
    }
}

impl Component for ModuleInfo {}
