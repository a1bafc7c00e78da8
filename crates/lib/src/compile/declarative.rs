//! Compiler that emits the entities a producer service declares.

use std::collections::HashMap;

use tracing::debug;

use super::{Action, CompileError, Compiled, FragmentCompiler, Instance, Rule};
use crate::resource::ProducerService;
use crate::uniquify::Uniquifier;

/// Base name minted for rules that do not declare one.
const DEFAULT_RULE_NAME: &str = "rule";

/// Emits one instance per declared instance and one rule per declared rule.
///
/// Declared names are passed through the uniquifier, and action references
/// are rewritten to the minted instance names so they stay valid within the
/// destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarativeCompiler;

impl FragmentCompiler for DeclarativeCompiler {
  fn compile(&self, source: &ProducerService, names: &mut Uniquifier) -> Result<Compiled, CompileError> {
    let mut minted: HashMap<&str, String> = HashMap::with_capacity(source.instances.len());
    let mut instances = Vec::with_capacity(source.instances.len());

    for (index, spec) in source.instances.iter().enumerate() {
      if spec.name.is_empty() {
        return Err(CompileError::EmptyField { index, field: "name" });
      }
      if spec.template.is_empty() {
        return Err(CompileError::EmptyField {
          index,
          field: "template",
        });
      }
      if minted.contains_key(spec.name.as_str()) {
        return Err(CompileError::DuplicateInstance(spec.name.clone()));
      }

      let name = names.generate(&spec.name);
      minted.insert(spec.name.as_str(), name.clone());
      instances.push(Instance {
        name,
        template: spec.template.clone(),
        params: spec.params.clone(),
      });
    }

    let mut rules = Vec::with_capacity(source.rules.len());
    for spec in &source.rules {
      let declared = spec.name.as_deref().unwrap_or(DEFAULT_RULE_NAME);

      let mut actions = Vec::with_capacity(spec.actions.len());
      for action in &spec.actions {
        if action.handler.is_empty() {
          return Err(CompileError::MissingHandler {
            rule: declared.to_string(),
          });
        }
        let refs = action
          .instances
          .iter()
          .map(|r| {
            minted.get(r.as_str()).cloned().ok_or_else(|| CompileError::UnknownInstance {
              rule: declared.to_string(),
              instance: r.clone(),
            })
          })
          .collect::<Result<Vec<_>, _>>()?;
        actions.push(Action {
          handler: action.handler.clone(),
          instances: refs,
        });
      }

      rules.push(Rule {
        name: names.generate(declared),
        match_expr: spec.match_expr.clone(),
        actions,
      });
    }

    debug!(instances = instances.len(), rules = rules.len(), "compiled producer service");
    Ok(Compiled { instances, rules })
  }
}
