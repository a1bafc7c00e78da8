//! Shared helpers for library integration tests.

use std::sync::Arc;

use confrag_lib::bundle::DestinationBundle;
use confrag_lib::compile::DeclarativeCompiler;
use confrag_lib::destination::DestinationId;
use confrag_lib::fragment::{Encoder, JsonEncoder};
use confrag_lib::resource::ProducerService;

/// A bundle for `mixer/test` using the declarative compiler.
pub fn bundle() -> DestinationBundle {
  bundle_with(Arc::new(JsonEncoder))
}

pub fn bundle_with(encoder: Arc<dyn Encoder>) -> DestinationBundle {
  DestinationBundle::new(DestinationId::new("mixer", "test"), Arc::new(DeclarativeCompiler), encoder)
}

/// Parse a producer service from JSON.
pub fn service(json: &str) -> ProducerService {
  serde_json::from_str(json).unwrap_or_else(|e| panic!("bad producer service fixture: {}", e))
}

/// A producer service with one instance and one rule routing it.
pub fn metric_service(instance: &str) -> ProducerService {
  service(&format!(
    r#"{{
      "instances": [{{ "name": "{0}", "template": "metric", "params": {{ "value": "request.size" }} }}],
      "rules": [{{ "match": "true", "actions": [{{ "handler": "prometheus", "instances": ["{0}"] }}] }}]
    }}"#,
    instance
  ))
}
