use chrono::NaiveDate;
use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_types::{Bool, Text};
use diesel::{sql_query, QueryableByName, RunQueryDsl};
use log::warn;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

use crate::errors::{CustomResult, Error, QuerySnafu};
use crate::modules::config::DatabaseConfig;

pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// # identity of a single race
/// every record served by the api is keyed by the day, the venue and the
/// race number on that day
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct RaceKey {
    pub race_date: NaiveDate,
    pub stadium_code: String,
    pub race_number: i32,
}

impl RaceKey {
    pub fn new(race_date: NaiveDate, stadium_code: &str, race_number: i32) -> RaceKey {
        RaceKey {
            race_date,
            stadium_code: stadium_code.to_string(),
            race_number,
        }
    }

    pub fn matches(&self, race_date: NaiveDate, stadium_code: &str, race_number: i32) -> bool {
        self.race_date == race_date
            && self.stadium_code == stadium_code
            && self.race_number == race_number
    }
}

/// # create the connection pool
/// connections are opened lazily, so an unreachable database surfaces on
/// the first query and not here.
///
/// ## Arguments
/// * `config` - the selected database settings
///
/// ## Returns
/// * `PgPool` - the pool shared by every request
pub fn establish_pool(config: &DatabaseConfig) -> PgPool {
    let manager = ConnectionManager::<PgConnection>::new(config.url.as_str());

    Pool::builder()
        .max_size(config.pool_size)
        .build_unchecked(manager)
}

/// # convert raw rows into records
/// rows that do not convert are dropped and logged instead of failing the
/// whole query
///
/// ## Arguments
/// * `rows` - the rows as loaded from the store
/// * `target` - the log target of the caller
///
/// ## Returns
/// * `Vec<T>` - every row that converted
pub fn keep_valid<R, T>(rows: Vec<R>, target: &str) -> Vec<T>
where
    T: TryFrom<R, Error = Error>,
{
    rows.into_iter()
        .filter_map(|row| match T::try_from(row) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(target: target, "{}", error);
                None
            }
        })
        .collect()
}

#[derive(QueryableByName)]
struct TablePresence {
    #[diesel(sql_type = Bool)]
    present: bool,
}

/// check if a table exists in the connected database
pub fn table_exists(conn: &mut PgConnection, table_name: &str) -> CustomResult<bool> {
    sql_query("SELECT to_regclass($1) IS NOT NULL AS present")
        .bind::<Text, _>(table_name)
        .get_result::<TablePresence>(conn)
        .map(|presence| presence.present)
        .context(QuerySnafu)
}
