mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::models::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

const PROJECT_COLUMNS: &str = "id, name, description, status, budget, created_at, updated_at";

const ACTIVITY_COLUMNS: &str = "id, project_id, name, status, priority, planned_cost, actual_cost,
     completion_percentage, planned_start_date, actual_start_date, planned_duration,
     is_milestone, responsible, discipline, created_at, updated_at";

pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("", "", "tosabendo")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        let db_path = dirs.data_dir().join("tosabendo.db");
        Self::open(db_path)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Project operations
    // ============================================================

    pub fn get_all_projects(&self) -> Result<Vec<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM projects ORDER BY name",
            PROJECT_COLUMNS
        ))?;

        let projects = stmt
            .query_map([], project_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    pub fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM projects WHERE id = ?",
            PROJECT_COLUMNS
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(project_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        input.validate().map_err(anyhow::Error::msg)?;

        let conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();
        let status = input.status.unwrap_or_default();
        let budget = input.budget.unwrap_or(0.0);

        conn.execute(
            "INSERT INTO projects (id, name, description, status, budget, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                &input.name,
                &input.description,
                status.as_str(),
                budget,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ),
        )?;

        Ok(Project {
            id,
            name: input.name,
            description: input.description,
            status,
            budget,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn update_project(&self, id: Uuid, input: UpdateProjectInput) -> Result<Option<Project>> {
        input.validate().map_err(anyhow::Error::msg)?;

        let Some(existing) = self.get_project(id)? else {
            return Ok(None);
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        let now = Utc::now();
        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);
        let status = input.status.unwrap_or(existing.status);
        let budget = input.budget.unwrap_or(existing.budget);

        conn.execute(
            "UPDATE projects SET name = ?, description = ?, status = ?, budget = ?, updated_at = ?
             WHERE id = ?",
            (
                &name,
                &description,
                status.as_str(),
                budget,
                now.to_rfc3339(),
                id.to_string(),
            ),
        )?;

        Ok(Some(Project {
            id,
            name,
            description,
            status,
            budget,
            created_at: existing.created_at,
            updated_at: now,
        }))
    }

    /// Delete a project and, through the foreign key cascade, its activities.
    pub fn delete_project(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Activity operations
    // ============================================================

    pub fn get_all_activities(&self) -> Result<Vec<Activity>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM activities
             ORDER BY planned_start_date IS NULL, planned_start_date, name",
            ACTIVITY_COLUMNS
        ))?;

        let activities = stmt
            .query_map([], activity_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(activities)
    }

    /// Activities of one project, scheduled ones first by planned start.
    pub fn get_activities_by_project(&self, project_id: Uuid) -> Result<Vec<Activity>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM activities WHERE project_id = ?
             ORDER BY planned_start_date IS NULL, planned_start_date, name",
            ACTIVITY_COLUMNS
        ))?;

        let activities = stmt
            .query_map([project_id.to_string()], activity_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(activities)
    }

    pub fn get_activity(&self, id: Uuid) -> Result<Option<Activity>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM activities WHERE id = ?",
            ACTIVITY_COLUMNS
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(activity_from_row(row)?))
        } else {
            Ok(None)
        }
    }

    pub fn create_activity(&self, project_id: Uuid, input: CreateActivityInput) -> Result<Activity> {
        let mut created = self.create_activities(project_id, vec![input])?;
        created
            .pop()
            .ok_or_else(|| anyhow::anyhow!("Activity was not created"))
    }

    /// Insert several activities in one transaction. Either all are stored or none.
    pub fn create_activities(
        &self,
        project_id: Uuid,
        inputs: Vec<CreateActivityInput>,
    ) -> Result<Vec<Activity>> {
        for input in &inputs {
            input.validate().map_err(anyhow::Error::msg)?;
        }

        self.get_project(project_id)?
            .ok_or_else(|| anyhow::anyhow!("Project not found"))?;

        let mut conn = self.conn.lock().expect("database lock poisoned");
        let tx = conn.transaction()?;
        let now = Utc::now();
        let mut created = Vec::with_capacity(inputs.len());

        for input in inputs {
            let activity = Activity {
                id: Uuid::new_v4(),
                project_id,
                name: input.name,
                status: input.status.unwrap_or_default(),
                priority: input.priority.unwrap_or_default(),
                planned_cost: input.planned_cost.unwrap_or(0.0),
                actual_cost: input.actual_cost.unwrap_or(0.0),
                completion_percentage: input.completion_percentage.unwrap_or(0.0),
                planned_start_date: input.planned_start_date,
                actual_start_date: input.actual_start_date,
                planned_duration: input.planned_duration,
                is_milestone: input.is_milestone,
                responsible: input.responsible,
                discipline: input.discipline,
                created_at: now,
                updated_at: now,
            };

            tx.execute(
                &format!(
                    "INSERT INTO activities ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    ACTIVITY_COLUMNS
                ),
                params![
                    activity.id.to_string(),
                    activity.project_id.to_string(),
                    &activity.name,
                    activity.status.as_str(),
                    activity.priority.as_str(),
                    activity.planned_cost,
                    activity.actual_cost,
                    activity.completion_percentage,
                    activity.planned_start_date.map(format_date),
                    activity.actual_start_date.map(format_date),
                    activity.planned_duration,
                    activity.is_milestone,
                    &activity.responsible,
                    &activity.discipline,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )?;
            created.push(activity);
        }

        tx.commit()?;
        Ok(created)
    }

    pub fn update_activity(&self, id: Uuid, input: UpdateActivityInput) -> Result<Option<Activity>> {
        input.validate().map_err(anyhow::Error::msg)?;

        let Some(existing) = self.get_activity(id)? else {
            return Ok(None);
        };

        let now = Utc::now();
        let activity = Activity {
            id,
            project_id: existing.project_id,
            name: input.name.unwrap_or(existing.name),
            status: input.status.unwrap_or(existing.status),
            priority: input.priority.unwrap_or(existing.priority),
            planned_cost: input.planned_cost.unwrap_or(existing.planned_cost),
            actual_cost: input.actual_cost.unwrap_or(existing.actual_cost),
            completion_percentage: input
                .completion_percentage
                .unwrap_or(existing.completion_percentage),
            planned_start_date: input.planned_start_date.or(existing.planned_start_date),
            actual_start_date: input.actual_start_date.or(existing.actual_start_date),
            planned_duration: input.planned_duration.or(existing.planned_duration),
            is_milestone: input.is_milestone.unwrap_or(existing.is_milestone),
            responsible: input.responsible.or(existing.responsible),
            discipline: input.discipline.or(existing.discipline),
            created_at: existing.created_at,
            updated_at: now,
        };

        let conn = self.conn.lock().expect("database lock poisoned");
        conn.execute(
            "UPDATE activities SET name = ?, status = ?, priority = ?, planned_cost = ?,
                actual_cost = ?, completion_percentage = ?, planned_start_date = ?,
                actual_start_date = ?, planned_duration = ?, is_milestone = ?,
                responsible = ?, discipline = ?, updated_at = ?
             WHERE id = ?",
            params![
                &activity.name,
                activity.status.as_str(),
                activity.priority.as_str(),
                activity.planned_cost,
                activity.actual_cost,
                activity.completion_percentage,
                activity.planned_start_date.map(format_date),
                activity.actual_start_date.map(format_date),
                activity.planned_duration,
                activity.is_milestone,
                &activity.responsible,
                &activity.discipline,
                now.to_rfc3339(),
                id.to_string(),
            ],
        )?;

        Ok(Some(activity))
    }

    pub fn delete_activity(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM activities WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<Project> {
    Ok(Project {
        id: parse_uuid(row.get::<_, String>(0)?),
        name: row.get(1)?,
        description: row.get(2)?,
        status: ProjectStatus::from_str(&row.get::<_, String>(3)?).unwrap_or_default(),
        budget: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
        updated_at: parse_datetime(row.get::<_, String>(6)?),
    })
}

fn activity_from_row(row: &Row<'_>) -> rusqlite::Result<Activity> {
    Ok(Activity {
        id: parse_uuid(row.get::<_, String>(0)?),
        project_id: parse_uuid(row.get::<_, String>(1)?),
        name: row.get(2)?,
        status: ActivityStatus::from_str(&row.get::<_, String>(3)?).unwrap_or_default(),
        priority: Priority::from_str(&row.get::<_, String>(4)?).unwrap_or_default(),
        planned_cost: row.get(5)?,
        actual_cost: row.get(6)?,
        completion_percentage: row.get(7)?,
        planned_start_date: row.get::<_, Option<String>>(8)?.and_then(parse_date),
        actual_start_date: row.get::<_, Option<String>>(9)?.and_then(parse_date),
        planned_duration: row.get(10)?,
        is_milestone: row.get::<_, i32>(11)? != 0,
        responsible: row.get(12)?,
        discipline: row.get(13)?,
        created_at: parse_datetime(row.get::<_, String>(14)?),
        updated_at: parse_datetime(row.get::<_, String>(15)?),
    })
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_date(s: String) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(&s, DATE_FORMAT).ok()
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
