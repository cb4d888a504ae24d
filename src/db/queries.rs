use crate::models::{
    Customer, CustomerFilter, Dairy, EntryChanges, EntryFilter, EntryOrder, EntryWithCustomer,
    MilkEntry, NewCustomer, NewMilkEntry, NewProfile, Rate, SetRate, UpdateCustomer, UserProfile,
};
use bigdecimal::BigDecimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const CUSTOMER_COLUMNS: &str =
    "id, dairy_id, name, phone, address, status, created_at, updated_at";
const RATE_COLUMNS: &str = "id, dairy_id, fat, snf, rate_per_liter, created_at";
const ENTRY_COLUMNS: &str =
    "id, dairy_id, customer_id, date, shift, fat, snf, liters, amount, created_at";
const JOINED_ENTRY_COLUMNS: &str = "e.id, e.dairy_id, e.customer_id, e.date, e.shift, e.fat, \
     e.snf, e.liters, e.amount, e.created_at, c.name AS customer_name";

/// Escape LIKE wildcards so user input matches literally
fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

// ---------------------------------------------------------------------------
// dairies / users
// ---------------------------------------------------------------------------

pub async fn insert_dairy(pool: &PgPool, name: &str, owner_id: Uuid) -> Result<Dairy, sqlx::Error> {
    sqlx::query_as::<_, Dairy>(
        r#"
        INSERT INTO dairies (id, name, owner_id)
        VALUES ($1, $2, $3)
        RETURNING id, name, owner_id, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(owner_id)
    .fetch_one(pool)
    .await
}

pub async fn insert_profile(pool: &PgPool, profile: &NewProfile) -> Result<UserProfile, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        INSERT INTO users (id, dairy_id, role, customer_id)
        VALUES ($1, $2, $3, $4)
        RETURNING id, dairy_id, role, customer_id, created_at
        "#,
    )
    .bind(profile.user_id)
    .bind(profile.dairy_id)
    .bind(profile.role)
    .bind(profile.customer_id)
    .fetch_one(pool)
    .await
}

pub async fn get_profile(pool: &PgPool, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as::<_, UserProfile>(
        r#"
        SELECT id, dairy_id, role, customer_id, created_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

// ---------------------------------------------------------------------------
// customers
// ---------------------------------------------------------------------------

pub async fn insert_customer(
    pool: &PgPool,
    dairy_id: Uuid,
    input: &NewCustomer,
) -> Result<Customer, sqlx::Error> {
    let sql = format!(
        "INSERT INTO customers (id, dairy_id, name, phone, address) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {CUSTOMER_COLUMNS}"
    );
    sqlx::query_as::<_, Customer>(&sql)
        .bind(Uuid::new_v4())
        .bind(dairy_id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.address)
        .fetch_one(pool)
        .await
}

/// Active customers only
pub async fn get_customer(
    pool: &PgPool,
    dairy_id: Uuid,
    id: Uuid,
) -> Result<Option<Customer>, sqlx::Error> {
    let sql = format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers \
         WHERE dairy_id = $1 AND id = $2 AND status = 'active'"
    );
    sqlx::query_as::<_, Customer>(&sql)
        .bind(dairy_id)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Active customers ordered by name, optional ILIKE search and paging
pub async fn list_customers(
    pool: &PgPool,
    dairy_id: Uuid,
    filter: &CustomerFilter,
) -> Result<Vec<Customer>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE status = 'active' AND dairy_id = "
    ));
    qb.push_bind(dairy_id);

    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        qb.push(" AND name ILIKE ").push_bind(like_pattern(search.trim()));
    }

    qb.push(" ORDER BY name ASC");

    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    if let Some(offset) = filter.offset {
        qb.push(" OFFSET ").push_bind(offset);
    }

    qb.build_query_as::<Customer>().fetch_all(pool).await
}

/// Partial update; absent fields keep their stored value
pub async fn update_customer(
    pool: &PgPool,
    dairy_id: Uuid,
    id: Uuid,
    changes: &UpdateCustomer,
) -> Result<Option<Customer>, sqlx::Error> {
    let sql = format!(
        "UPDATE customers SET \
             name = COALESCE($3, name), \
             phone = COALESCE($4, phone), \
             address = COALESCE($5, address), \
             updated_at = now() \
         WHERE dairy_id = $1 AND id = $2 AND status = 'active' \
         RETURNING {CUSTOMER_COLUMNS}"
    );
    sqlx::query_as::<_, Customer>(&sql)
        .bind(dairy_id)
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.phone)
        .bind(&changes.address)
        .fetch_optional(pool)
        .await
}

/// Flag update; returns false when nothing active matched
pub async fn soft_delete_customer(pool: &PgPool, dairy_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE customers
        SET status = 'deleted', updated_at = now()
        WHERE dairy_id = $1 AND id = $2 AND status = 'active'
        "#,
    )
    .bind(dairy_id)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// rates
// ---------------------------------------------------------------------------

/// Upsert on (dairy_id, fat, snf): last write wins
pub async fn upsert_rate(pool: &PgPool, dairy_id: Uuid, input: &SetRate) -> Result<Rate, sqlx::Error> {
    let sql = format!(
        "INSERT INTO rates (id, dairy_id, fat, snf, rate_per_liter) \
         VALUES ($1, $2, $3, $4, $5) \
         ON CONFLICT (dairy_id, fat, snf) \
         DO UPDATE SET rate_per_liter = EXCLUDED.rate_per_liter \
         RETURNING {RATE_COLUMNS}"
    );
    sqlx::query_as::<_, Rate>(&sql)
        .bind(Uuid::new_v4())
        .bind(dairy_id)
        .bind(&input.fat)
        .bind(&input.snf)
        .bind(&input.rate_per_liter)
        .fetch_one(pool)
        .await
}

/// Exact grid-point lookup (NUMERIC equality, so 3.5 = 3.50)
pub async fn find_rate(
    pool: &PgPool,
    dairy_id: Uuid,
    fat: &BigDecimal,
    snf: &BigDecimal,
) -> Result<Option<Rate>, sqlx::Error> {
    let sql = format!(
        "SELECT {RATE_COLUMNS} FROM rates WHERE dairy_id = $1 AND fat = $2 AND snf = $3"
    );
    sqlx::query_as::<_, Rate>(&sql)
        .bind(dairy_id)
        .bind(fat)
        .bind(snf)
        .fetch_optional(pool)
        .await
}

/// All rates in ascending (fat, snf) order
pub async fn list_rates(pool: &PgPool, dairy_id: Uuid) -> Result<Vec<Rate>, sqlx::Error> {
    let sql = format!(
        "SELECT {RATE_COLUMNS} FROM rates WHERE dairy_id = $1 ORDER BY fat ASC, snf ASC"
    );
    sqlx::query_as::<_, Rate>(&sql)
        .bind(dairy_id)
        .fetch_all(pool)
        .await
}

pub async fn delete_rate(pool: &PgPool, dairy_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM rates WHERE dairy_id = $1 AND id = $2")
        .bind(dairy_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ---------------------------------------------------------------------------
// milk_entries
// ---------------------------------------------------------------------------

pub async fn insert_entry(
    pool: &PgPool,
    dairy_id: Uuid,
    entry: &NewMilkEntry,
) -> Result<MilkEntry, sqlx::Error> {
    let sql = format!(
        "INSERT INTO milk_entries (id, dairy_id, customer_id, date, shift, fat, snf, liters, amount) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING {ENTRY_COLUMNS}"
    );
    sqlx::query_as::<_, MilkEntry>(&sql)
        .bind(Uuid::new_v4())
        .bind(dairy_id)
        .bind(entry.customer_id)
        .bind(entry.date)
        .bind(entry.shift)
        .bind(&entry.fat)
        .bind(&entry.snf)
        .bind(&entry.liters)
        .bind(&entry.amount)
        .fetch_one(pool)
        .await
}

pub async fn get_entry(pool: &PgPool, dairy_id: Uuid, id: Uuid) -> Result<Option<MilkEntry>, sqlx::Error> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM milk_entries WHERE dairy_id = $1 AND id = $2");
    sqlx::query_as::<_, MilkEntry>(&sql)
        .bind(dairy_id)
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_entry(
    pool: &PgPool,
    dairy_id: Uuid,
    id: Uuid,
    changes: &EntryChanges,
) -> Result<Option<MilkEntry>, sqlx::Error> {
    let sql = format!(
        "UPDATE milk_entries SET shift = $3, fat = $4, snf = $5, liters = $6, amount = $7 \
         WHERE dairy_id = $1 AND id = $2 \
         RETURNING {ENTRY_COLUMNS}"
    );
    sqlx::query_as::<_, MilkEntry>(&sql)
        .bind(dairy_id)
        .bind(id)
        .bind(changes.shift)
        .bind(&changes.fat)
        .bind(&changes.snf)
        .bind(&changes.liters)
        .bind(&changes.amount)
        .fetch_optional(pool)
        .await
}

pub async fn delete_entry(pool: &PgPool, dairy_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM milk_entries WHERE dairy_id = $1 AND id = $2")
        .bind(dairy_id)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// WHERE / ORDER BY / LIMIT for a milk_entries select; `alias` prefixes every column
fn push_entry_filter(
    qb: &mut QueryBuilder<'_, Postgres>,
    alias: &str,
    dairy_id: Uuid,
    filter: &EntryFilter,
) {
    qb.push(format!(" WHERE {alias}dairy_id = ")).push_bind(dairy_id);

    if let Some(customer_id) = filter.customer_id {
        qb.push(format!(" AND {alias}customer_id = ")).push_bind(customer_id);
    }
    if let Some(start) = filter.start {
        qb.push(format!(" AND {alias}date >= ")).push_bind(start);
    }
    if let Some(end) = filter.end {
        qb.push(format!(" AND {alias}date <= ")).push_bind(end);
    }

    match filter.order {
        EntryOrder::Newest => qb.push(format!(
            " ORDER BY {alias}date DESC, {alias}created_at DESC"
        )),
        EntryOrder::Oldest => qb.push(format!(
            " ORDER BY {alias}date ASC, {alias}created_at ASC"
        )),
    };

    if let Some(limit) = filter.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
}

/// Filtered select; bounds are inclusive
pub async fn list_entries(
    pool: &PgPool,
    dairy_id: Uuid,
    filter: &EntryFilter,
) -> Result<Vec<MilkEntry>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new(format!("SELECT {ENTRY_COLUMNS} FROM milk_entries"));
    push_entry_filter(&mut qb, "", dairy_id, filter);

    tracing::debug!(sql = qb.sql(), "list_entries");
    qb.build_query_as::<MilkEntry>().fetch_all(pool).await
}

/// Same filter as [`list_entries`], with the customer's name. Deleted customers keep their name.
pub async fn list_entries_with_customer(
    pool: &PgPool,
    dairy_id: Uuid,
    filter: &EntryFilter,
) -> Result<Vec<EntryWithCustomer>, sqlx::Error> {
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(format!(
        "SELECT {JOINED_ENTRY_COLUMNS} FROM milk_entries e \
         LEFT JOIN customers c ON c.id = e.customer_id AND c.dairy_id = e.dairy_id"
    ));
    push_entry_filter(&mut qb, "e.", dairy_id, filter);

    tracing::debug!(sql = qb.sql(), "list_entries_with_customer");
    qb.build_query_as::<EntryWithCustomer>().fetch_all(pool).await
}

pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ram"), "%ram%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
