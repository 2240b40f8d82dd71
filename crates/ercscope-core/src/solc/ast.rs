//! Typed view over the subset of the solc JSON AST that the adapter reads.
//!
//! Every node kind the engine has no use for collapses into an `Other`
//! variant, so newer compiler versions with extra node types still parse.
//! Missing optional attributes default instead of failing; hand-written
//! fixtures rely on that.

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SourceUnit {
    #[serde(default)]
    pub absolute_path: String,
    #[serde(default)]
    pub nodes: Vec<SourceUnitNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "nodeType")]
pub enum SourceUnitNode {
    ContractDefinition(ContractDefinition),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContractDefinition {
    pub id: i64,
    pub name: String,
    /// `contract`, `interface` or `library`.
    #[serde(default = "default_contract_kind")]
    pub contract_kind: String,
    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,
    /// Most derived first; includes the contract itself.
    #[serde(default)]
    pub linearized_base_contracts: Vec<i64>,
    #[serde(default)]
    pub nodes: Vec<ContractNode>,
}

fn default_contract_kind() -> String {
    "contract".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "nodeType")]
pub enum ContractNode {
    FunctionDefinition(FunctionDefinition),
    EventDefinition(EventDefinition),
    ModifierDefinition(ModifierDefinition),
    VariableDeclaration(VariableDeclaration),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDefinition {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    /// `function`, `constructor`, `fallback`, `receive` or `freeFunction`.
    #[serde(default = "default_function_kind")]
    pub kind: String,
    pub visibility: String,
    pub state_mutability: String,
    #[serde(default)]
    pub parameters: ParameterList,
    #[serde(default)]
    pub return_parameters: ParameterList,
    #[serde(default)]
    pub modifiers: Vec<ModifierInvocation>,
    pub body: Option<Block>,
}

fn default_function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ParameterList {
    #[serde(default)]
    pub parameters: Vec<VariableDeclaration>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VariableDeclaration {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub type_descriptions: TypeDescriptions,
    pub type_name: Option<TypeName>,
    #[serde(default)]
    pub state_variable: bool,
    #[serde(default)]
    pub visibility: String,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub constant: bool,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptions {
    pub type_string: Option<String>,
}

/// Type syntax tree; only the shape needed for getter synthesis is kept.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TypeName {
    #[serde(default)]
    pub node_type: String,
    #[serde(default)]
    pub type_descriptions: TypeDescriptions,
    pub key_type: Option<Box<TypeName>>,
    pub value_type: Option<Box<TypeName>>,
    pub base_type: Option<Box<TypeName>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierInvocation {
    pub modifier_name: IdentifierPath,
    /// `modifierInvocation` or `baseConstructorSpecifier`; absent on old compilers.
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierPath {
    pub name: String,
    pub referenced_declaration: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDefinition {
    #[serde(default)]
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub parameters: ParameterList,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModifierDefinition {
    #[serde(default)]
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Block {
    #[serde(default)]
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "nodeType", rename_all_fields = "camelCase")]
pub enum Statement {
    Block(Block),
    UncheckedBlock(Block),
    ExpressionStatement {
        expression: Expression,
    },
    IfStatement {
        condition: Expression,
        true_body: Box<Statement>,
        false_body: Option<Box<Statement>>,
    },
    VariableDeclarationStatement {
        initial_value: Option<Expression>,
    },
    Return {
        expression: Option<Expression>,
    },
    EmitStatement {
        event_call: Expression,
    },
    RevertStatement {
        error_call: Expression,
    },
    ForStatement {
        initialization_expression: Option<Box<Statement>>,
        condition: Option<Expression>,
        loop_expression: Option<Box<Statement>>,
        body: Box<Statement>,
    },
    WhileStatement {
        condition: Expression,
        body: Box<Statement>,
    },
    DoWhileStatement {
        condition: Expression,
        body: Box<Statement>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "nodeType", rename_all_fields = "camelCase")]
pub enum Expression {
    Identifier {
        name: String,
        referenced_declaration: Option<i64>,
    },
    MemberAccess {
        member_name: String,
        expression: Box<Expression>,
        referenced_declaration: Option<i64>,
    },
    IndexAccess {
        base_expression: Box<Expression>,
        index_expression: Option<Box<Expression>>,
    },
    FunctionCall {
        expression: Box<Expression>,
        #[serde(default)]
        arguments: Vec<Expression>,
    },
    FunctionCallOptions {
        expression: Box<Expression>,
    },
    BinaryOperation {
        left_expression: Box<Expression>,
        right_expression: Box<Expression>,
    },
    UnaryOperation {
        operator: String,
        sub_expression: Box<Expression>,
    },
    Assignment {
        left_hand_side: Box<Expression>,
        right_hand_side: Box<Expression>,
    },
    Conditional {
        condition: Box<Expression>,
        true_expression: Box<Expression>,
        false_expression: Box<Expression>,
    },
    TupleExpression {
        #[serde(default)]
        components: Vec<Option<Expression>>,
    },
    #[serde(other)]
    Other,
}
