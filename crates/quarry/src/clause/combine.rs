use crate::context::Context;
use crate::dialect::Dialect;
use crate::error::{QuarryError, QuarryResult};
use crate::expression::Expression;
use crate::query::SubQuery;
use crate::value::Param;

pub const UNION: &str = "UNION";
pub const INTERSECT: &str = "INTERSECT";
pub const EXCEPT: &str = "EXCEPT";

/// `UNION [ALL] query` and friends.
#[derive(Debug, Clone, Default)]
pub struct Combine {
    pub strategy: String,
    pub query: Option<SubQuery>,
    pub all: bool,
}

impl Combine {
    pub fn new(strategy: &str, query: SubQuery, all: bool) -> Self {
        Self {
            strategy: strategy.to_owned(),
            query: Some(query),
            all,
        }
    }
}

impl Expression for Combine {
    fn write_sql(
        &self,
        ctx: &Context,
        w: &mut String,
        d: &dyn Dialect,
        start: usize,
    ) -> QuarryResult<Vec<Param>> {
        if self.strategy.is_empty() {
            return Err(QuarryError::NoCombinationStrategy);
        }

        w.push_str(&self.strategy);
        w.push_str(if self.all { " ALL " } else { " " });

        match &self.query {
            Some(q) => q.write_sql(ctx, w, d, start),
            None => Ok(Vec::new()),
        }
    }
}
