use crate::schema::{Constrained, Constraint, Rule};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub monthly_price: Decimal,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "crate::enrollment::Entity")]
    Enrollment,
}

impl Related<crate::enrollment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Enrollment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

const CONSTRAINTS: &[Constraint<Column>] = &[
    Constraint::new(Column::Title, Rule::Required),
    Constraint::new(Column::MonthlyPrice, Rule::Required),
    Constraint::new(Column::MonthlyPrice, Rule::NonNegative),
    Constraint::new(Column::MonthlyPrice, Rule::Decimal { precision: 10, scale: 2 }),
    Constraint::new(Column::CreatedAt, Rule::Required),
];

impl Constrained for Entity {
    fn constraints() -> &'static [Constraint<Column>] {
        CONSTRAINTS
    }
}
