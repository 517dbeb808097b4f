use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use super::model::{MealPlan, Week};

#[derive(Debug, Clone)]
pub struct StoredMealPlan {
    pub week: Week,
    pub meals: MealPlan,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// In-place change to a plan; returns whether anything changed.
pub type PlanEdit = Box<dyn FnOnce(&mut MealPlan) -> bool + Send>;

#[derive(Debug, Clone)]
pub enum EditOutcome {
    Saved(StoredMealPlan),
    /// The edit changed nothing, so nothing was written.
    Unchanged(Option<StoredMealPlan>),
}

/// Document store holding one meal plan per (user, week).
#[async_trait]
pub trait MealPlanStore: Send + Sync {
    async fn get_meal_plan(&self, user_id: Uuid, week: Week)
        -> anyhow::Result<Option<StoredMealPlan>>;
    async fn save_meal_plan(
        &self,
        user_id: Uuid,
        week: Week,
        meals: &MealPlan,
    ) -> anyhow::Result<StoredMealPlan>;
    /// Read-modify-write of one week, serialised against other edits of
    /// the same (user, week).
    async fn edit_meal_plan(
        &self,
        user_id: Uuid,
        week: Week,
        edit: PlanEdit,
    ) -> anyhow::Result<EditOutcome>;
    /// Returns whether a plan existed.
    async fn delete_meal_plan(&self, user_id: Uuid, week: Week) -> anyhow::Result<bool>;
    /// All of the user's plans, most recently updated first.
    async fn list_meal_plans(&self, user_id: Uuid) -> anyhow::Result<Vec<StoredMealPlan>>;
}

#[derive(Debug, FromRow)]
struct MealPlanRow {
    week_start: Date,
    meals: Json<MealPlan>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<MealPlanRow> for StoredMealPlan {
    fn from(r: MealPlanRow) -> Self {
        Self {
            week: Week::containing(r.week_start),
            meals: r.meals.0,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Clone)]
pub struct PgMealPlanStore {
    db: PgPool,
}

impl PgMealPlanStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MealPlanStore for PgMealPlanStore {
    async fn get_meal_plan(
        &self,
        user_id: Uuid,
        week: Week,
    ) -> anyhow::Result<Option<StoredMealPlan>> {
        let row = sqlx::query_as::<_, MealPlanRow>(
            r#"
            SELECT week_start, meals, created_at, updated_at
              FROM meal_plans
             WHERE user_id = $1 AND week_start = $2
            "#,
        )
        .bind(user_id)
        .bind(week.start())
        .fetch_optional(&self.db)
        .await
        .context("get meal plan")?;
        Ok(row.map(StoredMealPlan::from))
    }

    async fn save_meal_plan(
        &self,
        user_id: Uuid,
        week: Week,
        meals: &MealPlan,
    ) -> anyhow::Result<StoredMealPlan> {
        let row = sqlx::query_as::<_, MealPlanRow>(
            r#"
            INSERT INTO meal_plans (user_id, week_start, meals)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, week_start)
            DO UPDATE SET meals = EXCLUDED.meals, updated_at = now()
            RETURNING week_start, meals, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(week.start())
        .bind(Json(meals))
        .fetch_one(&self.db)
        .await
        .context("save meal plan")?;
        Ok(row.into())
    }

    async fn edit_meal_plan(
        &self,
        user_id: Uuid,
        week: Week,
        edit: PlanEdit,
    ) -> anyhow::Result<EditOutcome> {
        let mut tx = self.db.begin().await.context("begin meal plan edit")?;

        // Row locks cannot cover a week with no row yet, so take a
        // transaction-scoped advisory lock on the key instead.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(format!("meal_plans:{user_id}:{}", week.key()))
            .execute(&mut *tx)
            .await
            .context("lock meal plan")?;

        let current = sqlx::query_as::<_, MealPlanRow>(
            r#"
            SELECT week_start, meals, created_at, updated_at
              FROM meal_plans
             WHERE user_id = $1 AND week_start = $2
            "#,
        )
        .bind(user_id)
        .bind(week.start())
        .fetch_optional(&mut *tx)
        .await
        .context("read meal plan for edit")?
        .map(StoredMealPlan::from);

        let mut meals = current.as_ref().map(|p| p.meals.clone()).unwrap_or_default();
        if !edit(&mut meals) {
            tx.commit().await.context("end meal plan edit")?;
            return Ok(EditOutcome::Unchanged(current));
        }

        let row = sqlx::query_as::<_, MealPlanRow>(
            r#"
            INSERT INTO meal_plans (user_id, week_start, meals)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, week_start)
            DO UPDATE SET meals = EXCLUDED.meals, updated_at = now()
            RETURNING week_start, meals, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(week.start())
        .bind(Json(&meals))
        .fetch_one(&mut *tx)
        .await
        .context("write edited meal plan")?;
        tx.commit().await.context("commit meal plan edit")?;
        Ok(EditOutcome::Saved(row.into()))
    }

    async fn delete_meal_plan(&self, user_id: Uuid, week: Week) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM meal_plans WHERE user_id = $1 AND week_start = $2")
            .bind(user_id)
            .bind(week.start())
            .execute(&self.db)
            .await
            .context("delete meal plan")?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_meal_plans(&self, user_id: Uuid) -> anyhow::Result<Vec<StoredMealPlan>> {
        let rows = sqlx::query_as::<_, MealPlanRow>(
            r#"
            SELECT week_start, meals, created_at, updated_at
              FROM meal_plans
             WHERE user_id = $1
             ORDER BY updated_at DESC, week_start DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
        .context("list meal plans")?;
        Ok(rows.into_iter().map(StoredMealPlan::from).collect())
    }
}

#[cfg(test)]
pub use memory::InMemoryMealPlanStore;
