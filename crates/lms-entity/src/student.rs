use crate::schema::{Constrained, Constraint, Rule};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub enrollment_date: DateTime,
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

impl Related<crate::course::Entity> for Entity {
    fn to() -> RelationDef {
        crate::enrollment::Relation::Course.def()
    }

    fn via() -> Option<RelationDef> {
        Some(crate::enrollment::Relation::Student.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}

const CONSTRAINTS: &[Constraint<Column>] = &[
    Constraint::new(Column::Name, Rule::Required),
    Constraint::new(Column::Email, Rule::Required),
    Constraint::new(Column::Email, Rule::Email),
    Constraint::new(Column::Email, Rule::Unique),
    Constraint::new(Column::EnrollmentDate, Rule::Required),
];

impl Constrained for Entity {
    fn constraints() -> &'static [Constraint<Column>] {
        CONSTRAINTS
    }
}
