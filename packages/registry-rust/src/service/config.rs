/// Container-level configuration for registry composition.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// Display name given to registries built without an explicit one.
    pub default_display_name: String,
    /// Initial capacity of the classification cache. Sized for the number of
    /// distinct provider types a build typically registers.
    pub cache_capacity: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            default_display_name: "DefaultServiceRegistry".to_string(),
            cache_capacity: 64,
        }
    }
}
