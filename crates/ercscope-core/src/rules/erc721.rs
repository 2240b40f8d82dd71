//! ERC721 rule set.
//!
//! Events here constrain indexing: all three `Transfer`/`Approval` arguments
//! are indexed in ERC721, which is what distinguishes them from the ERC20
//! events of the same name.

use crate::rules::catalog::{
    Category, EventTemplate, FunctionTemplate, Predicate, Rule, RuleSet, Standard,
};

const BALANCE_OF: FunctionTemplate =
    FunctionTemplate::external("balanceOf", &["address"], &["uint256"]);
const OWNER_OF: FunctionTemplate = FunctionTemplate::external("ownerOf", &["uint256"], &["address"]);
const SAFE_TRANSFER_FROM_DATA: FunctionTemplate = FunctionTemplate::external(
    "safeTransferFrom",
    &["address", "address", "uint256", "bytes"],
    &[],
);
const SAFE_TRANSFER_FROM: FunctionTemplate =
    FunctionTemplate::external("safeTransferFrom", &["address", "address", "uint256"], &[]);
const TRANSFER_FROM: FunctionTemplate =
    FunctionTemplate::external("transferFrom", &["address", "address", "uint256"], &[]);
const APPROVE: FunctionTemplate = FunctionTemplate::external("approve", &["address", "uint256"], &[]);
const SET_APPROVAL_FOR_ALL: FunctionTemplate =
    FunctionTemplate::external("setApprovalForAll", &["address", "bool"], &[]);
const GET_APPROVED: FunctionTemplate =
    FunctionTemplate::external("getApproved", &["uint256"], &["address"]);
const IS_APPROVED_FOR_ALL: FunctionTemplate =
    FunctionTemplate::external("isApprovedForAll", &["address", "address"], &["bool"]);

const CORE: &[FunctionTemplate] = &[
    BALANCE_OF,
    OWNER_OF,
    SAFE_TRANSFER_FROM_DATA,
    SAFE_TRANSFER_FROM,
    TRANSFER_FROM,
    APPROVE,
    SET_APPROVAL_FOR_ALL,
    GET_APPROVED,
    IS_APPROVED_FOR_ALL,
];

const TRANSFER_EVENT: EventTemplate =
    EventTemplate::new("Transfer", &["address", "address", "uint256"]).indexed(&[true, true, true]);
const APPROVAL_EVENT: EventTemplate =
    EventTemplate::new("Approval", &["address", "address", "uint256"]).indexed(&[true, true, true]);
const APPROVAL_FOR_ALL_EVENT: EventTemplate =
    EventTemplate::new("ApprovalForAll", &["address", "address", "bool"]).indexed(&[true, true, false]);

pub static RULESET: RuleSet = RuleSet {
    standard: Standard::Erc721,
    categories: &[
        Category {
            name: "ERC721 functions",
            gating: true,
            rules: &[
                Rule::function("ERC721-FN-01", BALANCE_OF),
                Rule::function("ERC721-FN-02", OWNER_OF),
                Rule::function("ERC721-FN-03", SAFE_TRANSFER_FROM_DATA),
                Rule::function("ERC721-FN-04", SAFE_TRANSFER_FROM),
                Rule::function("ERC721-FN-05", TRANSFER_FROM),
                Rule::function("ERC721-FN-06", APPROVE),
                Rule::function("ERC721-FN-07", SET_APPROVAL_FOR_ALL),
                Rule::function("ERC721-FN-08", GET_APPROVED),
                Rule::function("ERC721-FN-09", IS_APPROVED_FOR_ALL),
            ],
        },
        Category {
            name: "Custom modifiers",
            gating: true,
            rules: &[Rule::predicate(
                "ERC721-MOD-01",
                Predicate::NoCustomModifiers { functions: CORE },
            )],
        },
        Category {
            name: "ERC721 events",
            gating: true,
            rules: &[
                Rule::event("ERC721-EV-01", TRANSFER_EVENT),
                Rule::event("ERC721-EV-02", APPROVAL_EVENT),
                Rule::event("ERC721-EV-03", APPROVAL_FOR_ALL_EVENT),
            ],
        },
        Category {
            name: "Event emission",
            gating: true,
            rules: &[
                Rule::predicate(
                    "ERC721-EMIT-01",
                    Predicate::EmitsEvent {
                        function: TRANSFER_FROM,
                        event: TRANSFER_EVENT,
                    },
                ),
                Rule::predicate(
                    "ERC721-EMIT-02",
                    Predicate::EmitsEvent {
                        function: SAFE_TRANSFER_FROM_DATA,
                        event: TRANSFER_EVENT,
                    },
                ),
                Rule::predicate(
                    "ERC721-EMIT-03",
                    Predicate::EmitsEvent {
                        function: SAFE_TRANSFER_FROM,
                        event: TRANSFER_EVENT,
                    },
                ),
                Rule::predicate(
                    "ERC721-EMIT-04",
                    Predicate::EmitsEvent {
                        function: APPROVE,
                        event: APPROVAL_EVENT,
                    },
                ),
                Rule::predicate(
                    "ERC721-EMIT-05",
                    Predicate::EmitsEvent {
                        function: SET_APPROVAL_FOR_ALL,
                        event: APPROVAL_FOR_ALL_EVENT,
                    },
                ),
            ],
        },
        Category {
            name: "ERC721 getters",
            gating: false,
            rules: &[
                Rule::function(
                    "ERC721-GET-01",
                    FunctionTemplate::external("name", &[], &["string"]),
                ),
                Rule::function(
                    "ERC721-GET-02",
                    FunctionTemplate::external("symbol", &[], &["string"]),
                ),
                Rule::function(
                    "ERC721-GET-03",
                    FunctionTemplate::external("tokenURI", &["uint256"], &["string"]),
                ),
            ],
        },
        Category {
            name: "ERC165",
            gating: true,
            rules: &[Rule::function(
                "ERC721-165-01",
                FunctionTemplate::external("supportsInterface", &["bytes4"], &["bool"]),
            )],
        },
    ],
};
