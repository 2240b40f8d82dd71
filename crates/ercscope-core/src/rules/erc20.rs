//! ERC20 rule set.

use crate::rules::catalog::{
    Category, EventTemplate, FunctionTemplate, Predicate, Rule, RuleSet, Standard,
};

const TRANSFER: FunctionTemplate =
    FunctionTemplate::external("transfer", &["address", "uint256"], &["bool"]);
const APPROVE: FunctionTemplate =
    FunctionTemplate::external("approve", &["address", "uint256"], &["bool"]);
const TRANSFER_FROM: FunctionTemplate =
    FunctionTemplate::external("transferFrom", &["address", "address", "uint256"], &["bool"]);
const ALLOWANCE: FunctionTemplate =
    FunctionTemplate::external("allowance", &["address", "address"], &["uint256"]);
const BALANCE_OF: FunctionTemplate =
    FunctionTemplate::external("balanceOf", &["address"], &["uint256"]);

const CORE: &[FunctionTemplate] = &[TRANSFER, APPROVE, TRANSFER_FROM, ALLOWANCE, BALANCE_OF];

const TRANSFER_EVENT: EventTemplate =
    EventTemplate::new("Transfer", &["address", "address", "uint256"]);
const APPROVAL_EVENT: EventTemplate =
    EventTemplate::new("Approval", &["address", "address", "uint256"]);

pub static RULESET: RuleSet = RuleSet {
    standard: Standard::Erc20,
    categories: &[
        Category {
            name: "ERC20 functions",
            gating: true,
            rules: &[
                Rule::function("ERC20-FN-01", TRANSFER),
                Rule::function("ERC20-FN-02", APPROVE),
                Rule::function("ERC20-FN-03", TRANSFER_FROM),
                Rule::function("ERC20-FN-04", ALLOWANCE),
                Rule::function("ERC20-FN-05", BALANCE_OF),
            ],
        },
        Category {
            name: "Custom modifiers",
            gating: true,
            rules: &[Rule::predicate(
                "ERC20-MOD-01",
                Predicate::NoCustomModifiers { functions: CORE },
            )],
        },
        Category {
            name: "ERC20 events",
            gating: true,
            rules: &[
                Rule::event("ERC20-EV-01", TRANSFER_EVENT),
                Rule::event("ERC20-EV-02", APPROVAL_EVENT),
            ],
        },
        Category {
            name: "Event emission",
            gating: true,
            rules: &[
                Rule::predicate(
                    "ERC20-EMIT-01",
                    Predicate::EmitsEvent {
                        function: TRANSFER,
                        event: TRANSFER_EVENT,
                    },
                ),
                Rule::predicate(
                    "ERC20-EMIT-02",
                    Predicate::EmitsEvent {
                        function: TRANSFER_FROM,
                        event: TRANSFER_EVENT,
                    },
                ),
                Rule::predicate(
                    "ERC20-EMIT-03",
                    Predicate::EmitsEvent {
                        function: APPROVE,
                        event: APPROVAL_EVENT,
                    },
                ),
            ],
        },
        Category {
            name: "ERC20 getters",
            gating: false,
            rules: &[
                Rule::function(
                    "ERC20-GET-01",
                    FunctionTemplate::external("totalSupply", &[], &["uint256"]),
                ),
                Rule::function(
                    "ERC20-GET-02",
                    FunctionTemplate::external("decimals", &[], &["uint8"]),
                ),
                Rule::function(
                    "ERC20-GET-03",
                    FunctionTemplate::external("symbol", &[], &["string"]),
                ),
                Rule::function(
                    "ERC20-GET-04",
                    FunctionTemplate::external("name", &[], &["string"]),
                ),
            ],
        },
        Category {
            name: "Frontrunning mitigation",
            gating: true,
            rules: &[
                Rule::function(
                    "ERC20-FR-01",
                    FunctionTemplate::external("increaseAllowance", &["address", "uint256"], &["bool"]),
                ),
                Rule::function(
                    "ERC20-FR-02",
                    FunctionTemplate::external("decreaseAllowance", &["address", "uint256"], &["bool"]),
                ),
            ],
        },
        Category {
            name: "Approve safety",
            gating: true,
            rules: &[Rule::predicate(
                "ERC20-APP-01",
                Predicate::NoBalanceGuard { function: APPROVE },
            )],
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_declared_in_checklist_order() {
        let names: Vec<&str> = RULESET.categories.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "ERC20 functions",
                "Custom modifiers",
                "ERC20 events",
                "Event emission",
                "ERC20 getters",
                "Frontrunning mitigation",
                "Approve safety",
            ]
        );
    }

    #[test]
    fn only_getters_are_advisory() {
        let advisory: Vec<&str> = RULESET
            .categories
            .iter()
            .filter(|c| !c.gating)
            .map(|c| c.name)
            .collect();
        assert_eq!(advisory, vec!["ERC20 getters"]);
    }

    #[test]
    fn core_function_titles_are_signatures() {
        let titles: Vec<String> = RULESET.categories[0].rules.iter().map(|r| r.title()).collect();
        assert_eq!(titles[0], "transfer(address,uint256) returns (bool)");
        assert_eq!(titles[2], "transferFrom(address,address,uint256) returns (bool)");
    }
}
