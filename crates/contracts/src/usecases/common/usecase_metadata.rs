/// Идентификация UseCase в логах и API
pub trait UseCaseMetadata {
    /// Короткий индекс, например "u001"
    fn usecase_index() -> &'static str;

    /// Техническое имя в snake_case
    fn usecase_name() -> &'static str;

    /// Название для оператора
    fn display_name() -> &'static str;

    fn description() -> &'static str {
        ""
    }

    /// `<index>_<name>`, используется как префикс записей журнала
    fn full_name() -> String {
        format!("{}_{}", Self::usecase_index(), Self::usecase_name())
    }
}
