use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::column_validator::{
    ColumnContractValidator, RequiredColumnSet, ValidationMessages, ValidationResult,
};
use crate::error::LoadError;
use crate::loader::{RemoteLoader, UploadLoader, UploadedFile, XlsxUploadLoader};
use crate::table::SheetCollection;

/// Presentation collaborator that shows validation feedback to the user
pub trait Feedback {
    fn success(&mut self, message: &str);
    fn error(&mut self, message: &str);
}

/// Single caller-facing verdict of an acquisition attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcquisitionOutcome {
    pub is_valid: bool,
    pub message: String,
}

impl From<ValidationResult> for AcquisitionOutcome {
    fn from(result: ValidationResult) -> Self {
        AcquisitionOutcome {
            is_valid: result.is_valid,
            message: result.message,
        }
    }
}

impl From<LoadError> for AcquisitionOutcome {
    fn from(error: LoadError) -> Self {
        AcquisitionOutcome {
            is_valid: false,
            message: error.to_string(),
        }
    }
}

/// Runs a loader and then the column validator for each way a workbook can arrive.
///
/// Every failure comes back as an invalid [`AcquisitionOutcome`]; nothing here panics or
/// returns an error to the presentation layer except [`load_remote`](Self::load_remote),
/// which hands the error over together with the missing data.
pub struct AcquisitionOrchestrator {
    upload_loader: Box<dyn UploadLoader>,
    remote_loader: RemoteLoader,
    upload_validator: ColumnContractValidator,
    in_memory_validator: ColumnContractValidator,
}

impl AcquisitionOrchestrator {
    pub fn new(remote_loader: RemoteLoader) -> Self {
        AcquisitionOrchestrator {
            upload_loader: Box::new(XlsxUploadLoader),
            remote_loader,
            upload_validator: ColumnContractValidator::for_upload(),
            in_memory_validator: ColumnContractValidator::for_in_memory(),
        }
    }

    pub fn with_upload_loader(mut self, loader: impl UploadLoader + 'static) -> Self {
        self.upload_loader = Box::new(loader);
        self
    }

    /// Validate against a different column contract, keeping the fixed messages
    pub fn with_required_columns(mut self, required: RequiredColumnSet) -> Self {
        self.upload_validator =
            ColumnContractValidator::new(required.clone(), ValidationMessages::upload());
        self.in_memory_validator =
            ColumnContractValidator::new(required, ValidationMessages::in_memory());
        self
    }

    pub fn remote_loader(&self) -> &RemoteLoader {
        &self.remote_loader
    }

    /// Decode and validate an uploaded file
    pub fn validate_upload(&self, file: Option<&UploadedFile>) -> AcquisitionOutcome {
        let Some(file) = file else {
            return LoadError::NoInput.into();
        };

        match self.upload_loader.load_from_handle(file) {
            Ok(sheets) => {
                let outcome: AcquisitionOutcome = self.upload_validator.validate(&sheets).into();
                info!(
                    file = file.name(),
                    is_valid = outcome.is_valid,
                    "Upload validated"
                );
                outcome
            }
            Err(e) => {
                warn!(file = file.name(), error = ?e, "Upload could not be loaded");
                e.into()
            }
        }
    }

    /// Upload widget flow: report the verdict through `feedback` and hand back the file
    /// only when it is valid. Without a file nothing is reported.
    pub fn accept_upload(
        &self,
        file: Option<UploadedFile>,
        feedback: &mut dyn Feedback,
    ) -> Option<UploadedFile> {
        let file = file?;
        let outcome = self.validate_upload(Some(&file));

        if outcome.is_valid {
            feedback.success(&outcome.message);
            Some(file)
        } else {
            feedback.error(&outcome.message);
            None
        }
    }

    /// Validate sheets that are already in memory
    pub fn validate_sheets(&self, sheets: &SheetCollection) -> AcquisitionOutcome {
        self.in_memory_validator.validate(sheets).into()
    }

    /// Load the public workbook, cached for the loader's TTL
    pub fn load_remote(&self) -> Result<Arc<SheetCollection>, LoadError> {
        self.remote_loader.load_from_url()
    }

    /// Load the public workbook and validate it as in-memory sheets
    pub fn validate_remote(&self) -> AcquisitionOutcome {
        match self.load_remote() {
            Ok(sheets) => self.validate_sheets(&sheets),
            Err(e) => e.into(),
        }
    }
}
