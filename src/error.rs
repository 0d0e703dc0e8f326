use thiserror::Error;

/// Failures that stop a workbook from reaching the column validator.
///
/// `Display` renders the fixed message shown to the user. Underlying causes are
/// kept on the variant for logging but only `Fetch` embeds one in its message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    #[error("Nenhum arquivo carregado.")]
    NoInput,

    #[error("O arquivo não pôde ser lido. Verifique se é um arquivo .xlsx válido.")]
    Decode { cause: String },

    #[error("Configuração incompleta: '{key}' não está definida no seu arquivo .env.")]
    Configuration { key: String },

    #[error(
        "Erro ao carregar a planilha da URL. Verifique o link no .env e se o arquivo é um .xlsx válido. (Erro: {cause})"
    )]
    Fetch { cause: String },

    #[error("Planilha carregada, mas está vazia (não contém abas).")]
    EmptyRemoteWorkbook,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("A required-column set must name at least one column")]
    Empty,
}
