//! Waterlog MCP Server Implementation
//!
//! Implements the MCP server with all waterlog tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::tools::intakes;
use crate::tools::profile::{self, ProfileFields};
use crate::tools::statistics;
use crate::tools::status::StatusTracker;
use crate::tools::water_goals;

/// Waterlog MCP Service
#[derive(Clone)]
pub struct WaterlogService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<WaterlogService>,
}

impl WaterlogService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Profile Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ProfileParams {
    /// man, woman, pregnant_female, breastfeeding_female
    pub gender: Option<String>,
    /// Years
    pub age: Option<i32>,
    pub height_cm: Option<f64>,
    pub weight_kg: Option<f64>,
    /// rare, occasional, weekly, daily
    pub physical_activity: Option<String>,
    /// e.g. united_kingdom, japan, average
    pub country: Option<String>,
    /// Daily water intake in ml
    pub daily_water_intake: Option<f64>,
    /// 0..1, extra share of the goal on hot days
    pub hot_day_extra_factor: Option<f64>,
    /// 0..1, extra share of the goal on highly active days
    pub high_activity_extra_factor: Option<f64>,
    /// Hour (0-23) at which a tracking day begins
    pub day_offset_hours: Option<u32>,
    /// ml or fl oz
    pub volume_units: Option<String>,
    /// kg or lbs
    pub weight_units: Option<String>,
    /// cm or ft
    pub length_units: Option<String>,
}

impl From<ProfileParams> for ProfileFields {
    fn from(p: ProfileParams) -> Self {
        Self {
            gender: p.gender,
            age: p.age,
            height_cm: p.height_cm,
            weight_kg: p.weight_kg,
            physical_activity: p.physical_activity,
            country: p.country,
            daily_water_intake: p.daily_water_intake,
            hot_day_extra_factor: p.hot_day_extra_factor,
            high_activity_extra_factor: p.high_activity_extra_factor,
            day_offset_hours: p.day_offset_hours,
            volume_units: p.volume_units,
            weight_units: p.weight_units,
            length_units: p.length_units,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OptionalDateParams {
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
}

// ============================================================================
// Intake Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogIntakeParams {
    pub drink_type: String,
    /// In the profile's volume units; defaults to the drink's last amount
    pub amount: Option<f64>,
    /// YYYY-MM-DDTHH:MM:SS local time, defaults to now
    pub timestamp: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IntakeIdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateIntakeParams {
    pub id: i64,
    pub drink_type: Option<String>,
    pub amount: Option<f64>,
    pub timestamp: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListIntakesParams {
    /// YYYY-MM-DD inclusive
    pub start_date: Option<String>,
    /// YYYY-MM-DD inclusive
    pub end_date: Option<String>,
    pub drink_type: Option<String>,
    #[serde(default = "default_list_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_list_limit() -> i64 { 50 }

// ============================================================================
// Water Goal Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetWaterGoalParams {
    /// YYYY-MM-DD, defaults to today
    pub date: Option<String>,
    /// In the profile's volume units
    pub base_amount: Option<f64>,
    pub is_hot_day: Option<bool>,
    pub is_high_activity: Option<bool>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteWaterGoalParams {
    /// YYYY-MM-DD
    pub date: String,
}

// ============================================================================
// Statistics Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct WeekStatisticsParams {
    /// YYYY-MM-DD, defaults to Monday of the current week
    pub week_start: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct YearStatisticsParams {
    pub year: Option<i32>,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl WaterlogService {
    // --- Status ---

    #[tool(description = "Get the current status of the waterlog service including build info, database status, and process information")]
    async fn waterlog_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        to_json(&status)
    }

    #[tool(description = "Get instructions for tracking hydration. Call this when starting a session or when unsure how to use the waterlog tools.")]
    fn hydration_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::HYDRATION_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(HYDRATION_INSTRUCTIONS)]))
    }

    // --- Profile ---

    #[tool(description = "Estimate the recommended daily water intake without saving anything. Omitted fields come from the stored profile.")]
    fn calculate_water_goal(&self, Parameters(p): Parameters<ProfileParams>) -> Result<CallToolResult, McpError> {
        let result = profile::calculate_water_goal(&self.database, p.into()).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get the user profile (defaults until one is saved)")]
    fn get_profile(&self) -> Result<CallToolResult, McpError> {
        let result = profile::get_profile(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Update profile fields. Only the given fields change. Call recalculate_water_goal afterwards to refresh the daily goal.")]
    fn set_profile(&self, Parameters(p): Parameters<ProfileParams>) -> Result<CallToolResult, McpError> {
        let result = profile::set_profile(&self.database, p.into()).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Estimate the daily water intake from the stored profile, save it, and store it as the water goal for the date (default today), keeping that day's hot day and high activity flags")]
    fn recalculate_water_goal(&self, Parameters(p): Parameters<OptionalDateParams>) -> Result<CallToolResult, McpError> {
        let result = profile::recalculate_water_goal(&self.database, p.date.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Intakes ---

    #[tool(description = "List the drink types with hydration factors and the amount last logged for each")]
    fn list_drinks(&self) -> Result<CallToolResult, McpError> {
        let result = intakes::list_drinks(&self.database).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Log a drink. Amount is in the profile's volume units and defaults to the drink's last logged amount.")]
    fn log_intake(&self, Parameters(p): Parameters<LogIntakeParams>) -> Result<CallToolResult, McpError> {
        let result = intakes::log_intake(&self.database, &p.drink_type, p.amount, p.timestamp.as_deref(), p.notes.as_deref())
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get a logged intake by ID")]
    fn get_intake(&self, Parameters(p): Parameters<IntakeIdParams>) -> Result<CallToolResult, McpError> {
        let result = intakes::get_intake(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(intake) => to_json(&intake),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Intake not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    #[tool(description = "Update a logged intake. Only the given fields change.")]
    fn update_intake(&self, Parameters(p): Parameters<UpdateIntakeParams>) -> Result<CallToolResult, McpError> {
        let result = intakes::update_intake(
            &self.database,
            p.id,
            p.drink_type.as_deref(),
            p.amount,
            p.timestamp.as_deref(),
            p.notes.as_deref(),
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        match result {
            Some(intake) => to_json(&intake),
            None => Ok(CallToolResult::success(vec![Content::text(format!(
                r#"{{"error": "Intake not found", "id": {}}}"#,
                p.id
            ))])),
        }
    }

    #[tool(description = "Delete a logged intake")]
    fn delete_intake(&self, Parameters(p): Parameters<IntakeIdParams>) -> Result<CallToolResult, McpError> {
        let result = intakes::delete_intake(&self.database, p.id).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "List logged intakes, newest first, with optional inclusive date range, drink filter and pagination")]
    fn list_intakes(&self, Parameters(p): Parameters<ListIntakesParams>) -> Result<CallToolResult, McpError> {
        let result = intakes::list_intakes(
            &self.database,
            p.start_date.as_deref(),
            p.end_date.as_deref(),
            p.drink_type.as_deref(),
            p.limit,
            p.offset,
        )
        .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Water Goals ---

    #[tool(description = "Set the water goal for a date (default today). Mark hot or highly active days to raise the goal by the profile's extra factors.")]
    fn set_water_goal(&self, Parameters(p): Parameters<SetWaterGoalParams>) -> Result<CallToolResult, McpError> {
        let result = water_goals::set_water_goal(&self.database, p.date.as_deref(), p.base_amount, p.is_hot_day, p.is_high_activity)
            .map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get the water goal in effect for a date (default today) and whether it is the day's own goal or inherited")]
    fn get_water_goal(&self, Parameters(p): Parameters<OptionalDateParams>) -> Result<CallToolResult, McpError> {
        let result = water_goals::get_water_goal(&self.database, p.date.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Delete the water goal stored for a date")]
    fn delete_water_goal(&self, Parameters(p): Parameters<DeleteWaterGoalParams>) -> Result<CallToolResult, McpError> {
        let result = water_goals::delete_water_goal(&self.database, &p.date).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    // --- Statistics ---

    #[tool(description = "Get the intakes, per-drink totals, water balance and goal progress for a day (default today)")]
    fn get_day_summary(&self, Parameters(p): Parameters<OptionalDateParams>) -> Result<CallToolResult, McpError> {
        let result = statistics::get_day_summary(&self.database, p.date.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get daily water balance and goals for the 7 days starting at week_start")]
    fn get_week_statistics(&self, Parameters(p): Parameters<WeekStatisticsParams>) -> Result<CallToolResult, McpError> {
        let result = statistics::get_week_statistics(&self.database, p.week_start.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get daily water balance and goals for every day of the month containing date")]
    fn get_month_statistics(&self, Parameters(p): Parameters<OptionalDateParams>) -> Result<CallToolResult, McpError> {
        let result = statistics::get_month_statistics(&self.database, p.date.as_deref()).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }

    #[tool(description = "Get average daily water balance and goal for each month of a year")]
    fn get_year_statistics(&self, Parameters(p): Parameters<YearStatisticsParams>) -> Result<CallToolResult, McpError> {
        let result = statistics::get_year_statistics(&self.database, p.year).map_err(|e| McpError::internal_error(e, None))?;
        to_json(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for WaterlogService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "waterlog".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Waterlog".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Waterlog - hydration tracking and daily water goal estimation. \
                 Call hydration_instructions first when unsure. \
                 Profile: get_profile/set_profile, calculate_water_goal (preview), recalculate_water_goal (save). \
                 Drinks: list_drinks. \
                 Intakes: log/get/update/delete_intake, list_intakes. \
                 Goals: set/get/delete_water_goal. \
                 Statistics: get_day_summary, get_week_statistics, get_month_statistics, get_year_statistics."
                    .into(),
            ),
        }
    }
}
