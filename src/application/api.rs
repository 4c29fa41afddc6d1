//! Transport facade
//!
//! Request/response contract of the category ordering endpoints, independent
//! of any wire format. Requests are validated here, dispatched to the order
//! engine, and successful mutations answer with a freshly rebuilt tree.
//!
//! | outcome                                   | status |
//! |-------------------------------------------|--------|
//! | applied / read                            | 200    |
//! | unknown action, missing or bad argument   | 400    |
//! | term not found                            | 404    |
//! | invalid move, cycle                       | 409    |
//! | store failure                             | 500    |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::application::services::{OrderService, Outcome, QueryService};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{DomainError, ReorderItem, TermId, TreeNode, ROOT};

pub const STATUS_OK: u16 = 200;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_NOT_FOUND: u16 = 404;
pub const STATUS_CONFLICT: u16 = 409;
pub const STATUS_INTERNAL_ERROR: u16 = 500;

/// Mutation requested through [`CategoryApi::update_order`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    SetOrder,
    SetParent,
    SetPosition,
}

impl OrderAction {
    pub const ALL: [OrderAction; 7] = [
        OrderAction::MoveUp,
        OrderAction::MoveDown,
        OrderAction::MoveLeft,
        OrderAction::MoveRight,
        OrderAction::SetOrder,
        OrderAction::SetParent,
        OrderAction::SetPosition,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderAction::MoveUp => "move_up",
            OrderAction::MoveDown => "move_down",
            OrderAction::MoveLeft => "move_left",
            OrderAction::MoveRight => "move_right",
            OrderAction::SetOrder => "set_order",
            OrderAction::SetParent => "set_parent",
            OrderAction::SetPosition => "set_position",
        }
    }
}

impl FromStr for OrderAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| DomainError::InvalidArgument(format!("Unknown action: {}", s)))
    }
}

impl fmt::Display for OrderAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an update-order request.
///
/// `action` stays a plain string so an unknown action is answered with 400
/// instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrderRequest {
    pub category_id: TermId,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_order: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_parent: Option<TermId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl UpdateOrderRequest {
    pub fn new(category_id: TermId, action: OrderAction) -> Self {
        Self {
            category_id,
            action: action.as_str().to_string(),
            new_order: None,
            new_parent: None,
            position: None,
        }
    }

    pub fn with_new_order(mut self, new_order: i64) -> Self {
        self.new_order = Some(new_order);
        self
    }

    pub fn with_new_parent(mut self, new_parent: TermId) -> Self {
        self.new_parent = Some(new_parent);
        self
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }
}

/// Response of every endpoint. `status` is carried out of band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryResponse {
    #[serde(skip)]
    pub status: u16,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<TreeNode>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub type UpdateOrderResponse = CategoryResponse;
pub type GetCategoriesResponse = CategoryResponse;

impl CategoryResponse {
    pub fn ok(categories: Vec<TreeNode>) -> Self {
        Self {
            status: STATUS_OK,
            success: true,
            categories: Some(categories),
            message: None,
        }
    }

    pub fn failure(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            success: false,
            categories: None,
            message: Some(message.into()),
        }
    }

    pub fn rejected(error: &DomainError) -> Self {
        Self::failure(status_for(error), error.to_string())
    }

    fn store_failure(error: &ApplicationError) -> Self {
        Self::failure(STATUS_INTERNAL_ERROR, format!("Failed to update: {}", error))
    }

    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Status code for a business-rule rejection.
pub fn status_for(error: &DomainError) -> u16 {
    match error {
        DomainError::NotFound(_) => STATUS_NOT_FOUND,
        DomainError::InvalidTransition { .. } | DomainError::CycleRejected { .. } => {
            STATUS_CONFLICT
        }
        DomainError::InvalidArgument(_) => STATUS_BAD_REQUEST,
    }
}

/// Endpoint handlers over the order engine and query facade.
pub struct CategoryApi {
    orders: OrderService,
    queries: QueryService,
}

impl CategoryApi {
    pub fn new(orders: OrderService, queries: QueryService) -> Self {
        Self { orders, queries }
    }

    /// Apply one mutation and answer with the refreshed full tree.
    #[instrument(level = "debug", skip(self), fields(id = request.category_id, action = %request.action))]
    pub fn update_order(&self, request: &UpdateOrderRequest) -> UpdateOrderResponse {
        let action = match request.action.parse::<OrderAction>() {
            Ok(action) => action,
            Err(e) => return CategoryResponse::rejected(&e),
        };

        match self.dispatch(action, request) {
            Ok(Outcome::Applied) => {
                info!("{} applied to {}", action, request.category_id);
                self.full_tree()
            }
            Ok(Outcome::Rejected(e)) => {
                info!("{} rejected for {}: {}", action, request.category_id, e);
                CategoryResponse::rejected(&e)
            }
            Err(e) => {
                warn!("{} failed for {}: {}", action, request.category_id, e);
                CategoryResponse::store_failure(&e)
            }
        }
    }

    /// Parse a JSON request body and apply it. Malformed bodies answer 400.
    pub fn update_order_json(&self, body: &str) -> UpdateOrderResponse {
        match serde_json::from_str::<UpdateOrderRequest>(body) {
            Ok(request) => self.update_order(&request),
            Err(e) => CategoryResponse::failure(
                STATUS_BAD_REQUEST,
                format!("Invalid request body: {}", e),
            ),
        }
    }

    /// Full tree, or only the top-level categories as leaves.
    #[instrument(level = "debug", skip(self))]
    pub fn get_categories(&self, parent_only: bool) -> GetCategoriesResponse {
        let result = if parent_only {
            self.queries.get_root_categories()
        } else {
            self.queries.get_tree().map(|t| t.into_nodes())
        };
        match result {
            Ok(nodes) => CategoryResponse::ok(nodes),
            Err(e) => CategoryResponse::failure(STATUS_INTERNAL_ERROR, e.to_string()),
        }
    }

    /// Apply a drag-and-drop batch. Item failures do not fail the request.
    #[instrument(level = "debug", skip(self, items), fields(items = items.len()))]
    pub fn bulk_reorder(&self, items: &[ReorderItem]) -> CategoryResponse {
        let report = self.orders.bulk_reorder(items);
        if report.failed > 0 {
            warn!("bulk reorder: {} of {} items failed", report.failed, report.attempted);
        }
        self.full_tree()
    }

    fn dispatch(
        &self,
        action: OrderAction,
        request: &UpdateOrderRequest,
    ) -> ApplicationResult<Outcome> {
        let id = request.category_id;
        match action {
            OrderAction::MoveUp => self.orders.move_up(id),
            OrderAction::MoveDown => self.orders.move_down(id),
            OrderAction::MoveLeft => self.orders.move_left(id),
            OrderAction::MoveRight => self.orders.move_right(id),
            OrderAction::SetOrder => match request.new_order {
                Some(order) => self.orders.set_order(id, order),
                None => Ok(Outcome::Rejected(DomainError::InvalidArgument(
                    "new_order is required for set_order".into(),
                ))),
            },
            OrderAction::SetParent => self
                .orders
                .set_parent(id, request.new_parent.unwrap_or(ROOT)),
            OrderAction::SetPosition => self
                .orders
                .set_position(id, request.position.as_deref().unwrap_or("")),
        }
    }

    fn full_tree(&self) -> CategoryResponse {
        match self.queries.get_tree() {
            Ok(tree) => CategoryResponse::ok(tree.into_nodes()),
            Err(e) => CategoryResponse::store_failure(&e),
        }
    }
}
