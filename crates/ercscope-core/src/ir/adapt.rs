use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::config::CheckConfig;
use crate::error::AdapterError;
use crate::ir::flow::{Callee, Scope, statement_facts};
use crate::ir::model::*;
use crate::ir::types::canonical_type;
use crate::solc::ast::{
    ContractDefinition, ContractNode, FunctionDefinition, IdentifierPath, ParameterList,
    SourceUnitNode, VariableDeclaration,
};
use crate::solc::frontend::CompiledUnits;
use crate::util::deterministic;

struct Located<'a> {
    contract: &'a ContractDefinition,
    unit_path: &'a str,
}

/// Translates compiler output into the closed `ContractIr` shape.
///
/// This is the only place that looks at AST nodes. Members are gathered along
/// the linearised inheritance chain, most derived first, so an override hides
/// the base declaration with the same identity.
pub fn adapt(
    compiled: &CompiledUnits,
    contract_name: &str,
    source_path: &str,
    config: &CheckConfig,
) -> Result<ContractIr, AdapterError> {
    let mut by_id: BTreeMap<i64, Located<'_>> = BTreeMap::new();
    let mut candidates: Vec<Located<'_>> = Vec::new();
    let mut available: BTreeSet<String> = BTreeSet::new();

    for unit in &compiled.units {
        for node in &unit.nodes {
            if let SourceUnitNode::ContractDefinition(contract) = node {
                available.insert(contract.name.clone());
                let located = || Located {
                    contract,
                    unit_path: unit.absolute_path.as_str(),
                };
                by_id.insert(contract.id, located());
                if contract.name == contract_name {
                    candidates.push(located());
                }
            }
        }
    }

    let target = candidates
        .iter()
        .find(|c| paths_match(c.unit_path, source_path))
        .or_else(|| candidates.first())
        .ok_or_else(|| AdapterError::ContractNotFound {
            name: contract_name.to_string(),
            available: available.into_iter().collect(),
        })?;

    let mut warnings = Vec::new();
    let lineage: Vec<i64> = if target.contract.linearized_base_contracts.is_empty() {
        vec![target.contract.id]
    } else {
        target.contract.linearized_base_contracts.clone()
    };
    let hierarchy: Vec<&Located<'_>> = lineage
        .iter()
        .filter_map(|id| {
            let found = by_id.get(id);
            if found.is_none() {
                warnings.push(format!("base contract #{id} is missing from compiler output"));
            }
            found
        })
        .collect();

    let mut ir = ContractIr {
        name: target.contract.name.clone(),
        kind: target.contract.contract_kind.clone(),
        source_path: target.unit_path.to_string(),
        ..Default::default()
    };
    let mut scope = Scope::default();
    let mut modifier_names: BTreeMap<i64, String> = BTreeMap::new();

    // State variables and events first: function facts resolve against them.
    for located in &hierarchy {
        for node in &located.contract.nodes {
            match node {
                ContractNode::VariableDeclaration(var) => {
                    scope.state_vars.insert(var.id, var.name.clone());
                    scope.state_var_names.insert(var.name.clone());
                }
                ContractNode::EventDefinition(event) => {
                    let descriptor = EventDescriptor {
                        name: event.name.clone(),
                        params: event
                            .parameters
                            .parameters
                            .iter()
                            .map(|p| EventParam {
                                ty: declared_type(p),
                                indexed: p.indexed,
                            })
                            .collect(),
                    };
                    scope.events_by_id.insert(event.id, descriptor.clone());
                    scope
                        .events_by_name
                        .entry(event.name.clone())
                        .or_insert_with(|| descriptor.clone());
                    if !ir.events.iter().any(|e| same_event(e, &descriptor)) {
                        ir.events.push(descriptor);
                    }
                }
                ContractNode::ModifierDefinition(modifier) => {
                    modifier_names.insert(modifier.id, modifier.name.clone());
                    if ir.modifier(&modifier.name).is_none() {
                        ir.modifiers.push(ModifierDescriptor {
                            name: modifier.name.clone(),
                            user_defined: !config.is_library_path(located.unit_path),
                            declared_in: located.contract.name.clone(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    let mut bodies: Vec<(FunctionKey, &FunctionDefinition)> = Vec::new();
    let mut seen: BTreeSet<FunctionKey> = BTreeSet::new();

    for located in &hierarchy {
        let declared_in = located.contract.name.as_str();
        for node in &located.contract.nodes {
            match node {
                ContractNode::FunctionDefinition(def) if def.kind == "function" => {
                    let descriptor = function_descriptor(def, declared_in, &modifier_names)?;
                    let key = descriptor.key();
                    scope.functions_by_id.insert(
                        def.id,
                        Callee {
                            key: key.clone(),
                            mutability: descriptor.mutability,
                        },
                    );
                    if seen.insert(key.clone()) {
                        scope
                            .functions_by_name
                            .entry(descriptor.name.clone())
                            .or_default()
                            .push(Callee {
                                key: key.clone(),
                                mutability: descriptor.mutability,
                            });
                        bodies.push((key, def));
                        ir.functions.push(descriptor);
                    }
                }
                ContractNode::VariableDeclaration(var) if var.visibility == "public" => {
                    let descriptor = getter_descriptor(var, declared_in);
                    let key = descriptor.key();
                    if seen.insert(key.clone()) {
                        ir.facts.insert(key, StatementFacts::default());
                        ir.functions.push(descriptor);
                    }
                }
                _ => {}
            }
        }
    }

    for (key, def) in bodies {
        let facts = statement_facts(def.body.as_ref(), &scope);
        ir.facts.insert(key, facts);
    }

    for f in &ir.functions {
        for m in &f.modifiers {
            if ir.modifier(m).is_none() {
                warnings.push(format!(
                    "modifier `{m}` on `{}` is not declared in the hierarchy",
                    f.key()
                ));
            }
        }
    }
    if ir.kind == "interface" {
        warnings.push(format!(
            "`{}` is an interface; function bodies are absent",
            ir.name
        ));
    }
    if ir.functions.is_empty() {
        warnings.push(format!("`{}` declares no functions", ir.name));
    }

    deterministic::sort_functions(&mut ir.functions);
    deterministic::sort_events(&mut ir.events);
    deterministic::sort_modifiers(&mut ir.modifiers);
    warnings.sort();
    warnings.dedup();
    ir.warnings = warnings;

    debug!(
        contract = %ir.name,
        functions = ir.functions.len(),
        events = ir.events.len(),
        modifiers = ir.modifiers.len(),
        "adapted contract"
    );

    Ok(ir)
}

fn paths_match(unit_path: &str, source_path: &str) -> bool {
    let a = unit_path.trim_start_matches("./");
    let b = source_path.trim_start_matches("./");
    a == b || a.ends_with(&format!("/{b}")) || b.ends_with(&format!("/{a}"))
}

fn same_event(a: &EventDescriptor, b: &EventDescriptor) -> bool {
    a.name == b.name && a.param_types().eq(b.param_types())
}

fn declared_type(var: &VariableDeclaration) -> String {
    var.type_descriptions
        .type_string
        .as_deref()
        .map(canonical_type)
        .unwrap_or_default()
}

fn parameters(list: &ParameterList) -> Vec<Parameter> {
    list.parameters
        .iter()
        .map(|p| Parameter {
            name: p.name.clone(),
            ty: declared_type(p),
        })
        .collect()
}

fn function_descriptor(
    def: &FunctionDefinition,
    declared_in: &str,
    modifier_names: &BTreeMap<i64, String>,
) -> Result<FunctionDescriptor, AdapterError> {
    let malformed = |detail: String| AdapterError::MalformedAst {
        contract: declared_in.to_string(),
        detail,
    };

    let visibility = match def.visibility.as_str() {
        "external" => Visibility::External,
        "public" => Visibility::Public,
        "internal" => Visibility::Internal,
        "private" => Visibility::Private,
        other => return Err(malformed(format!("function `{}` has visibility `{other}`", def.name))),
    };
    let mutability = match def.state_mutability.as_str() {
        "pure" => Mutability::Pure,
        // Pre-0.5 compilers report `constant` for view functions.
        "view" | "constant" => Mutability::View,
        "nonpayable" => Mutability::Nonpayable,
        "payable" => Mutability::Payable,
        other => {
            return Err(malformed(format!(
                "function `{}` has state mutability `{other}`",
                def.name
            )));
        }
    };

    Ok(FunctionDescriptor {
        name: def.name.clone(),
        params: parameters(&def.parameters),
        returns: def
            .return_parameters
            .parameters
            .iter()
            .map(declared_type)
            .collect(),
        visibility,
        mutability,
        modifiers: def
            .modifiers
            .iter()
            .filter(|m| m.kind.as_deref() != Some("baseConstructorSpecifier"))
            .map(|m| modifier_name(&m.modifier_name, modifier_names))
            .collect(),
        declared_in: declared_in.to_string(),
    })
}

/// Declared name of an invoked modifier. Invocations may be qualified
/// (`Ownable.onlyOwner`); the reference id wins, else the last path segment.
fn modifier_name(path: &IdentifierPath, declared: &BTreeMap<i64, String>) -> String {
    path.referenced_declaration
        .and_then(|id| declared.get(&id))
        .cloned()
        .unwrap_or_else(|| path.name.rsplit('.').next().unwrap_or(path.name.as_str()).to_string())
}

/// Accessor solc generates for a public state variable: one parameter per
/// mapping key or array index, the leaf type as the return value.
fn getter_descriptor(var: &VariableDeclaration, declared_in: &str) -> FunctionDescriptor {
    let mut params = Vec::new();
    let mut ret = declared_type(var);

    let mut current = var.type_name.as_ref();
    while let Some(type_name) = current {
        match type_name.node_type.as_str() {
            "Mapping" => {
                let key = type_name
                    .key_type
                    .as_ref()
                    .and_then(|k| k.type_descriptions.type_string.as_deref())
                    .map(canonical_type)
                    .unwrap_or_default();
                params.push(Parameter {
                    name: String::new(),
                    ty: key,
                });
                current = type_name.value_type.as_deref();
            }
            "ArrayTypeName" => {
                params.push(Parameter {
                    name: String::new(),
                    ty: "uint256".to_string(),
                });
                current = type_name.base_type.as_deref();
            }
            _ => {
                if let Some(ty) = type_name.type_descriptions.type_string.as_deref() {
                    ret = canonical_type(ty);
                }
                current = None;
            }
        }
    }

    FunctionDescriptor {
        name: var.name.clone(),
        params,
        returns: vec![ret],
        visibility: Visibility::Public,
        mutability: Mutability::View,
        modifiers: BTreeSet::new(),
        declared_in: declared_in.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solc::fixtures::*;
    use serde_json::json;

    fn adapt_one(units: Vec<serde_json::Value>, name: &str) -> Result<ContractIr, AdapterError> {
        adapt(&compiled(units), name, "src/Token.sol", &CheckConfig::default())
    }

    #[test]
    fn adapts_minimal_token() {
        let ir = adapt_one(vec![unit("src/Token.sol", vec![minimal_erc20()])], "MinimalToken").unwrap();

        let names: Vec<&str> = ir.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["_move", "allowance", "approve", "balanceOf", "transfer", "transferFrom"]
        );
        assert_eq!(ir.events.len(), 2);
        assert_eq!(ir.kind, "contract");
        assert!(ir.warnings.is_empty());

        let transfer = ir.functions.iter().find(|f| f.name == "transfer").unwrap();
        assert_eq!(transfer.signature(), "transfer(address,uint256) returns (bool)");
        assert_eq!(transfer.visibility, Visibility::External);

        let facts = ir.facts_for(transfer).unwrap();
        assert!(facts.internal_calls.iter().any(|k| k.name == "_move"));
    }

    #[test]
    fn missing_contract_lists_available_names() {
        let err = adapt_one(
            vec![unit("src/Token.sol", vec![minimal_erc20(), interface(50, "IERC20", vec![])])],
            "Nope",
        )
        .unwrap_err();

        match err {
            AdapterError::ContractNotFound { name, available } => {
                assert_eq!(name, "Nope");
                assert_eq!(available, vec!["IERC20".to_string(), "MinimalToken".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn derived_override_hides_base_function() {
        let base = contract(
            20,
            "Base",
            &[],
            vec![function(21, "transfer", &[("to", "address"), ("v", "uint256")], &["bool"], "public", "nonpayable")],
        );
        let derived = contract(
            30,
            "Derived",
            &[20],
            vec![function(31, "transfer", &[("dst", "address"), ("wad", "uint256")], &["bool"], "external", "nonpayable")],
        );

        let ir = adapt_one(vec![unit("src/Token.sol", vec![base, derived])], "Derived").unwrap();

        assert_eq!(ir.functions.len(), 1);
        assert_eq!(ir.functions[0].declared_in, "Derived");
        assert_eq!(ir.functions[0].visibility, Visibility::External);
    }

    #[test]
    fn public_state_variables_become_getters() {
        let token = contract(
            1,
            "Token",
            &[],
            vec![
                state_var(2, "name", "string storage ref", "public"),
                state_var(3, "decimals", "uint8", "public"),
                state_var(4, "owner", "address", "private"),
                mapping_var(5, "allowance", &["address", "address"], "uint256", "public"),
                json!({
                    "nodeType": "VariableDeclaration", "id": 6, "name": "holders",
                    "stateVariable": true, "visibility": "public",
                    "typeDescriptions": { "typeString": "address[] storage ref" },
                    "typeName": { "nodeType": "ArrayTypeName",
                                  "typeDescriptions": { "typeString": "address[]" },
                                  "baseType": { "nodeType": "ElementaryTypeName",
                                                "typeDescriptions": { "typeString": "address payable" } } }
                }),
            ],
        );

        let ir = adapt_one(vec![unit("src/Token.sol", vec![token])], "Token").unwrap();
        let sigs: Vec<String> = ir.functions.iter().map(|f| f.signature()).collect();

        assert_eq!(
            sigs,
            vec![
                "allowance(address,address) returns (uint256)",
                "decimals() returns (uint8)",
                "holders(uint256) returns (address)",
                "name() returns (string)",
            ]
        );
        assert!(ir.functions.iter().all(|f| f.mutability == Mutability::View));
    }

    #[test]
    fn library_modifiers_are_not_user_defined() {
        let ownable = contract(40, "Ownable", &[], vec![modifier(41, "onlyOwner")]);
        let token = contract(
            1,
            "Token",
            &[40],
            vec![
                modifier(2, "whenOpen"),
                with_modifiers(
                    function(3, "transfer", &[("to", "address"), ("v", "uint256")], &["bool"], "public", "nonpayable"),
                    &["onlyOwner", "whenOpen", "ghost"],
                ),
            ],
        );

        let ir = adapt_one(
            vec![
                unit("@openzeppelin/contracts/access/Ownable.sol", vec![ownable]),
                unit("src/Token.sol", vec![token]),
            ],
            "Token",
        )
        .unwrap();

        assert!(!ir.modifier("onlyOwner").unwrap().user_defined);
        assert!(ir.modifier("whenOpen").unwrap().user_defined);
        assert_eq!(
            ir.warnings,
            vec!["modifier `ghost` on `transfer(address,uint256)` is not declared in the hierarchy"]
        );
    }

    #[test]
    fn qualified_modifier_invocations_resolve_to_declarations() {
        let ownable = contract(40, "Ownable", &[], vec![modifier(41, "onlyOwner")]);
        let mut transfer =
            function(3, "transfer", &[("to", "address"), ("v", "uint256")], &["bool"], "public", "nonpayable");
        transfer["modifiers"] = json!([
            { "modifierName": { "name": "Ownable.onlyOwner", "referencedDeclaration": 41 }, "kind": "modifierInvocation" }
        ]);
        let mut approve =
            function(4, "approve", &[("s", "address"), ("v", "uint256")], &["bool"], "public", "nonpayable");
        approve["modifiers"] = json!([
            { "modifierName": { "name": "Ownable.onlyOwner" }, "kind": "modifierInvocation" }
        ]);
        let token = contract(1, "Token", &[40], vec![transfer, approve]);

        let ir = adapt_one(
            vec![
                unit("@openzeppelin/contracts/access/Ownable.sol", vec![ownable]),
                unit("src/Token.sol", vec![token]),
            ],
            "Token",
        )
        .unwrap();

        for f in &ir.functions {
            let names: Vec<&str> = f.modifiers.iter().map(String::as_str).collect();
            assert_eq!(names, vec!["onlyOwner"], "{}", f.name);
        }
        assert!(!ir.modifier("onlyOwner").unwrap().user_defined);
        assert!(ir.warnings.is_empty(), "{:?}", ir.warnings);
    }

    #[test]
    fn array_of_contracts_is_not_an_address_overload() {
        let token = contract(
            1,
            "Token",
            &[],
            vec![
                function(2, "transfer", &[("to", "contract IERC20[] memory"), ("v", "uint256")], &["bool"], "public", "nonpayable"),
                function(3, "transfer", &[("to", "address"), ("v", "uint256")], &["bool"], "public", "nonpayable"),
            ],
        );

        let ir = adapt_one(vec![unit("src/Token.sol", vec![token])], "Token").unwrap();
        let keys: Vec<String> = ir.functions.iter().map(|f| f.key().to_string()).collect();

        assert!(keys.contains(&"transfer(address,uint256)".to_string()), "{keys:?}");
        assert!(keys.contains(&"transfer(address[],uint256)".to_string()), "{keys:?}");
        assert_eq!(ir.functions.len(), 2);
        let array = ir.functions.iter().find(|f| f.params[0].ty == "address[]").unwrap();
        assert_eq!(array.declared_in, "Token");
    }

    #[test]
    fn skips_constructors_and_base_constructor_specifiers() {
        let mut ctor = function(2, "", &[("supply", "uint256")], &[], "public", "nonpayable");
        ctor["kind"] = json!("constructor");
        let mut f = function(3, "mint", &[], &[], "public", "nonpayable");
        f["modifiers"] = json!([
            { "modifierName": { "name": "ERC20" }, "kind": "baseConstructorSpecifier" }
        ]);

        let ir = adapt_one(vec![unit("src/Token.sol", vec![contract(1, "Token", &[], vec![ctor, f])])], "Token")
            .unwrap();

        assert_eq!(ir.functions.len(), 1);
        assert!(ir.functions[0].modifiers.is_empty());
    }

    #[test]
    fn unknown_visibility_is_malformed() {
        let f = function(2, "transfer", &[], &[], "everywhere", "nonpayable");
        let err = adapt_one(vec![unit("src/Token.sol", vec![contract(1, "Token", &[], vec![f])])], "Token")
            .unwrap_err();
        assert!(matches!(err, AdapterError::MalformedAst { .. }));
    }

    #[test]
    fn prefers_contract_from_the_inspected_file() {
        let other = contract(1, "Token", &[], vec![]);
        let wanted = contract(2, "Token", &[], vec![function(3, "ping", &[], &[], "external", "pure")]);

        let ir = adapt_one(
            vec![unit("lib/Other.sol", vec![other]), unit("src/Token.sol", vec![wanted])],
            "Token",
        )
        .unwrap();

        assert_eq!(ir.source_path, "src/Token.sol");
        assert_eq!(ir.functions.len(), 1);
    }

    #[test]
    fn interface_and_empty_contracts_are_warned() {
        let ir = adapt_one(vec![unit("src/Token.sol", vec![interface(1, "IToken", vec![])])], "IToken").unwrap();
        assert_eq!(
            ir.warnings,
            vec![
                "`IToken` declares no functions".to_string(),
                "`IToken` is an interface; function bodies are absent".to_string(),
            ]
        );
    }

    #[test]
    fn missing_base_contract_is_warned() {
        let c = contract(1, "Token", &[77], vec![]);
        let ir = adapt_one(vec![unit("src/Token.sol", vec![c])], "Token").unwrap();
        assert!(ir.warnings.iter().any(|w| w.contains("#77")));
    }

    #[test]
    fn events_are_unioned_across_hierarchy() {
        let base = interface(10, "IERC20", vec![event(11, "Transfer", &[("address", true), ("address", true), ("uint256", false)])]);
        let token = contract(
            1,
            "Token",
            &[10],
            vec![
                event(2, "Transfer", &[("address", false), ("address", false), ("uint256", false)]),
                event(3, "Approval", &[("address", true), ("address", true), ("uint256", false)]),
            ],
        );

        let ir = adapt_one(vec![unit("src/Token.sol", vec![base, token])], "Token").unwrap();

        let sigs: Vec<String> = ir.events.iter().map(|e| e.signature()).collect();
        assert_eq!(
            sigs,
            vec![
                "Approval(address indexed,address indexed,uint256)",
                "Transfer(address,address,uint256)",
            ]
        );
    }
}
