//! Defect entity.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "defects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub report_id: String,
    pub vehicle_frame_no: String,
    pub model_name: String,
    pub defect_category: String,
    pub defect_notes: Option<String>,
    pub image_key: Option<String>,
    /// JSON array of zone codes, e.g. `["L2","R1"]`.
    #[sea_orm(column_type = "JsonBinary")]
    pub targeted_zones: Json,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::zone_response::Entity")]
    ZoneResponses,
    #[sea_orm(has_one = "super::manager_analysis::Entity")]
    ManagerAnalysis,
}

impl Related<super::zone_response::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ZoneResponses.def()
    }
}

impl Related<super::manager_analysis::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ManagerAnalysis.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
