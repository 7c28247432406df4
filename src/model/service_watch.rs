use crate::RegistryConfig;

/// One monitored registry service.
///
/// The registry path is derived from the service name once, at creation, and
/// `children` always holds the snapshot returned by the most recent watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceWatch {
    pub service: String,
    pub path: String,
    pub children: Vec<String>,
}

impl ServiceWatch {
    pub fn new(
        service: impl Into<String>,
        registry: &RegistryConfig,
    ) -> Self {
        let service = service.into();
        let path = registry.providers_path(&service);
        Self {
            service,
            path,
            children: Vec::new(),
        }
    }

    pub(crate) fn replace_children(
        &mut self,
        children: Vec<String>,
    ) {
        self.children = children;
    }
}
