pub mod course;
pub mod enrollment;
pub mod lesson;
pub mod review;
pub mod schema;
pub mod student;
pub mod video_submission;

pub use sea_orm;

#[cfg(test)]
mod tests {
    use crate::schema::{Constrained, Rule, ValidationError, Violation};
    use crate::{course, enrollment, lesson, review, student, video_submission};
    use sea_orm::prelude::Decimal;
    use sea_orm::{
        ActiveEnum, ActiveValue, DbBackend, EntityTrait, IdenStatic, Iterable, NotSet, QuerySelect, QueryTrait,
    };

    fn date() -> sea_orm::prelude::DateTime {
        sea_orm::prelude::Date::from_ymd_opt(2024, 1, 10)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .unwrap()
    }

    fn enum_values<E: ActiveEnum<Value = String> + Iterable>() -> Vec<String> {
        E::iter().map(|value| value.to_value()).collect()
    }

    #[test]
    fn status_metadata_matches_enumerations() {
        assert_eq!(enum_values::<enrollment::Status>(), enrollment::STATUS_VALUES);
        assert_eq!(enum_values::<lesson::Status>(), lesson::STATUS_VALUES);
        assert_eq!(enum_values::<video_submission::Status>(), video_submission::STATUS_VALUES);
    }

    fn references<E: Constrained>() -> Vec<String> {
        E::references()
            .map(|(column, table)| format!("{} -> {table}", column.as_str()))
            .collect()
    }

    #[test]
    fn references_follow_relations() {
        assert_eq!(
            references::<enrollment::Entity>(),
            ["student_id -> students", "course_id -> courses"]
        );
        assert_eq!(references::<lesson::Entity>(), ["enrollment_id -> enrollments"]);
        assert_eq!(references::<video_submission::Entity>(), ["lesson_id -> lessons"]);
        assert_eq!(references::<review::Entity>(), ["submission_id -> video_submissions"]);
        assert!(references::<student::Entity>().is_empty());
    }

    #[test]
    fn student_email_is_the_only_unique_column() {
        let unique: Vec<_> = student::Entity::unique_columns().map(|column| column.as_str().to_owned()).collect();
        assert_eq!(unique, ["email"]);
        assert_eq!(course::Entity::unique_columns().count(), 0);
    }

    #[test]
    fn validate_student_model() {
        let mut student = student::Model {
            id: 101,
            name: "Taro".to_owned(),
            email: "taro@example.com".to_owned(),
            enrollment_date: date(),
        };
        assert_eq!(student::Entity::validate_model(&student), Ok(()));

        student.name = String::new();
        assert_eq!(
            student::Entity::validate_model(&student),
            Err(ValidationError::new("students", "name", Violation::Missing))
        );

        student.name = "Taro".to_owned();
        student.email = "taro.example.com".to_owned();
        assert_eq!(
            student::Entity::validate_model(&student),
            Err(ValidationError::new(
                "students",
                "email",
                Violation::InvalidEmail("taro.example.com".to_owned())
            ))
        );
    }

    #[test]
    fn validate_course_price() {
        let course = course::Model {
            id: 201,
            title: "Algebra".to_owned(),
            description: None,
            monthly_price: Decimal::new(-100, 2),
            created_at: date(),
        };
        let error = course::Entity::validate_model(&course).unwrap_err();
        assert_eq!(error.column, "monthly_price");
        assert_eq!(error.violation, Violation::Negative("-1.00".to_owned()));
    }

    #[test]
    fn validate_changes_ignores_unset_columns() {
        let lesson = lesson::ActiveModel {
            id: ActiveValue::Unchanged(1),
            duration_minutes: ActiveValue::Set(0),
            notes: NotSet,
            ..Default::default()
        };
        let error = lesson::Entity::validate_changes(&lesson).unwrap_err();
        assert_eq!(error.column, "duration_minutes");

        let review = review::ActiveModel {
            id: ActiveValue::Unchanged(1),
            feedback: ActiveValue::Set(Some("great".to_owned())),
            ..Default::default()
        };
        assert_eq!(review::Entity::validate_changes(&review), Ok(()));
    }

    #[test]
    fn rating_bounds_come_from_metadata() {
        let rule = review::Entity::constraints()
            .iter()
            .find(|constraint| constraint.column.as_str() == "rating")
            .map(|constraint| constraint.rule);
        assert_eq!(rule, Some(Rule::Between(1, 5)));
    }

    #[test]
    fn student_to_enrollment_join_follows_foreign_key() {
        let statement = student::Entity::find()
            .select_only()
            .column(student::Column::Name)
            .inner_join(enrollment::Entity)
            .build(DbBackend::Sqlite)
            .to_string();
        assert_eq!(
            statement,
            r#"SELECT "students"."name" FROM "students" INNER JOIN "enrollments" ON "students"."id" = "enrollments"."student_id""#
        );
    }
}
