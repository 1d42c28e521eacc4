//! Interceptor chain.

use crate::components::Interceptor;
use std::sync::Arc;

/// Interceptors in installation order. The first installed is the innermost wrapper.
#[derive(Debug, Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    /// Wrap `target` with every interceptor in order.
    pub fn plugin_all(&self, target: String) -> String {
        self.interceptors
            .iter()
            .fold(target, |wrapped, interceptor| interceptor.plugin(wrapped))
    }

    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Interceptor>> {
        self.interceptors.iter()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Wrap(&'static str);

    impl Interceptor for Wrap {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_plugin_all_wraps_in_order() {
        let mut chain = InterceptorChain::new();
        chain.add(Arc::new(Wrap("paging")));
        chain.add(Arc::new(Wrap("audit")));
        assert_eq!(chain.plugin_all("executor".to_string()), "audit(paging(executor))");
        assert_eq!(chain.names(), vec!["paging", "audit"]);
    }

    #[test]
    fn test_empty_chain_returns_target() {
        let chain = InterceptorChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.plugin_all("executor".to_string()), "executor");
    }
}
