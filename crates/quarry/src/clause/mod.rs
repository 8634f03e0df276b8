//! Clause containers.
//!
//! Each clause is a plain aggregate that renders one part of a statement and
//! writes nothing when it is empty, so statements can chain them with
//! [`express_if`](crate::express_if) and [`express_slice`](crate::express_slice).

mod combine;
mod conflict;
mod cte;
mod from;
mod group_by;
mod limit;
mod order_by;
mod returning;
mod select_list;
mod set;
mod table;
mod values;
mod where_;
mod window;

pub use combine::{Combine, EXCEPT, INTERSECT, UNION};
pub use conflict::{ConflictClause, ConflictTarget};
pub use cte::{Cte, CteCycle, CteSearch, SEARCH_BREADTH, SEARCH_DEPTH, With};
pub use from::{
    CROSS_JOIN, FULL_JOIN, FromItem, INNER_JOIN, Join, LEFT_JOIN, RIGHT_JOIN, STRAIGHT_JOIN,
};
pub use group_by::GroupBy;
pub use limit::{Limit, Offset};
pub use order_by::{OrderBy, OrderDef, order_def};
pub use returning::Returning;
pub use select_list::SelectList;
pub use set::Set;
pub use table::Table;
pub use values::{Row as ValuesRow, Values};
pub use where_::{Having, Where};
pub use window::{Frame, NamedWindow, Window, Windows};
