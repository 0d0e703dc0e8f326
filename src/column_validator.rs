use serde::Serialize;
use tracing::{debug, info};

use crate::error::ContractError;
use crate::table::{SheetCollection, Table};

/// Columns every equivalence-table sheet must carry, in the order they are reported
pub const EQUIVALENCE_TABLE_COLUMNS: [&str; 6] = [
    "Códigos Origem",
    "Nomes Origem",
    "Equivalente?",
    "Códigos UFRJ Destino",
    "Nomes UFRJ Destino",
    "Justificativa Parecer",
];

/// A non-empty set of column names compared by exact string equality.
///
/// Declaration order is kept only to make failure messages stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredColumnSet {
    columns: Vec<String>,
}

impl RequiredColumnSet {
    /// Build a set from column names, dropping repeats
    pub fn new<I, S>(columns: I) -> Result<Self, ContractError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for column in columns {
            let column = column.into();
            if !unique.contains(&column) {
                unique.push(column);
            }
        }

        if unique.is_empty() {
            return Err(ContractError::Empty);
        }

        Ok(RequiredColumnSet { columns: unique })
    }

    /// The six-column contract of the equivalence table dataset
    pub fn equivalence_table() -> Self {
        RequiredColumnSet {
            columns: EQUIVALENCE_TABLE_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// True when every required column is among the table's columns
    pub fn is_satisfied_by(&self, table: &Table) -> bool {
        let columns = table.columns();
        self.iter().all(|required| columns.contains(required))
    }

    /// Required columns the table lacks, in declaration order
    pub fn missing_from(&self, table: &Table) -> Vec<String> {
        let columns = table.columns();
        self.iter()
            .filter(|required| !columns.contains(required))
            .map(str::to_string)
            .collect()
    }

    /// All required names joined with ", "
    pub fn joined(&self) -> String {
        self.columns.join(", ")
    }
}

impl Default for RequiredColumnSet {
    fn default() -> Self {
        RequiredColumnSet::equivalence_table()
    }
}

/// Fixed user-facing messages for one validation entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationMessages {
    pub empty_workbook: &'static str,
    pub success: &'static str,
    /// Followed directly by the joined required-column names
    pub missing_columns: &'static str,
}

impl ValidationMessages {
    /// Messages for a freshly uploaded file
    pub fn upload() -> Self {
        ValidationMessages {
            empty_workbook: "O arquivo .xlsx está vazio (não contém abas).",
            success: "Planilha validada: Pelo menos uma aba de faculdade válida foi encontrada.",
            missing_columns: "Validação falhou! Nenhuma aba na planilha contém o conjunto completo de colunas obrigatórias. Verifique se pelo menos uma aba possui: ",
        }
    }

    /// Messages for sheets that are already in memory (e.g. loaded from the public URL)
    pub fn in_memory() -> Self {
        ValidationMessages {
            empty_workbook: "Os dados da planilha estão vazios (não contêm abas).",
            success: "Validação bem-sucedida: Pelo menos uma aba válida foi encontrada.",
            missing_columns: "Validação falhou! Nenhuma aba na planilha contém o conjunto completo de colunas obrigatórias: ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationOutcome {
    /// `sheet` is the first sheet, in workbook order, that carries every required column
    Valid { sheet: String },
    EmptyWorkbook,
    /// No sheet qualified; lists what each sheet lacks
    MissingColumns {
        missing_by_sheet: Vec<(String, Vec<String>)>,
    },
}

/// Verdict of one validation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
    pub outcome: ValidationOutcome,
}

impl ValidationResult {
    pub fn into_pair(self) -> (bool, String) {
        (self.is_valid, self.message)
    }
}

/// Decides whether at least one sheet of a workbook satisfies a required-column contract
#[derive(Debug, Clone)]
pub struct ColumnContractValidator {
    required: RequiredColumnSet,
    messages: ValidationMessages,
}

impl ColumnContractValidator {
    pub fn new(required: RequiredColumnSet, messages: ValidationMessages) -> Self {
        ColumnContractValidator { required, messages }
    }

    /// Equivalence-table contract with the upload messages
    pub fn for_upload() -> Self {
        Self::new(
            RequiredColumnSet::equivalence_table(),
            ValidationMessages::upload(),
        )
    }

    /// Equivalence-table contract with the in-memory messages
    pub fn for_in_memory() -> Self {
        Self::new(
            RequiredColumnSet::equivalence_table(),
            ValidationMessages::in_memory(),
        )
    }

    pub fn required(&self) -> &RequiredColumnSet {
        &self.required
    }

    /// Search the sheets in workbook order and stop at the first one that qualifies
    pub fn validate(&self, sheets: &SheetCollection) -> ValidationResult {
        if sheets.is_empty() {
            info!("Workbook has no sheets");
            return ValidationResult {
                is_valid: false,
                message: self.messages.empty_workbook.to_string(),
                outcome: ValidationOutcome::EmptyWorkbook,
            };
        }

        let mut missing_by_sheet: Vec<(String, Vec<String>)> = Vec::new();

        for (sheet_name, table) in sheets.iter() {
            let missing = self.required.missing_from(table);
            if missing.is_empty() {
                info!(sheet = sheet_name, "Sheet satisfies the required columns");
                return ValidationResult {
                    is_valid: true,
                    message: self.messages.success.to_string(),
                    outcome: ValidationOutcome::Valid {
                        sheet: sheet_name.to_string(),
                    },
                };
            }

            debug!(sheet = sheet_name, missing = ?missing, "Sheet lacks required columns");
            missing_by_sheet.push((sheet_name.to_string(), missing));
        }

        info!(
            sheets = sheets.len(),
            "No sheet satisfies the required columns"
        );
        ValidationResult {
            is_valid: false,
            message: format!("{}{}", self.messages.missing_columns, self.required.joined()),
            outcome: ValidationOutcome::MissingColumns { missing_by_sheet },
        }
    }
}

impl Default for ColumnContractValidator {
    fn default() -> Self {
        ColumnContractValidator::for_upload()
    }
}
