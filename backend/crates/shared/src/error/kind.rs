//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum that maps to the wire-level
//! `errorCode` tokens and HTTP status codes.

use serde::Serialize;

/// エラー種別の列挙体
///
/// APIレスポンスの `errorCode` トークンと HTTP ステータスコードに
/// 対応するエラー分類を定義します。
///
/// ## Notes
/// * `non_exhaustive` - 将来的に列挙子が追加される可能性があることを示す
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::NotFound;
/// assert_eq!(kind.status_code(), 404);
/// assert_eq!(kind.code(), "NOT_FOUND");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// 400 - ペイロードの解析失敗、必須フィールドの欠落
    InvalidInput,
    /// 400 - フィールドがバリデーションルールに違反
    ValidationFailed,
    /// 400 - 画像のMIMEスニッフィングがPNG/JPEGに一致しない
    InvalidImage,
    /// 400 - 画像が5MiBを超過
    ImageTooLarge,
    /// 401 - トークン不正・期限切れ・失効、Google検証失敗、MFA失敗
    Unauthorized,
    /// 403 - 認証済みだが許可されていない（ロール不一致、所有者でない等）
    Forbidden,
    /// 404 - 参照先エンティティが存在しない
    NotFound,
    /// 409 - 一意性制約違反
    Duplicate,
    /// 429 - MFA試行回数超過
    RateLimited,
    /// 502 - バリデーション通過後に下流インフラが失敗
    OperationFailed,
    /// 500 - 分類不能
    Internal,
}

impl ErrorKind {
    /// HTTP ステータスコードを取得
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidInput
            | ErrorKind::ValidationFailed
            | ErrorKind::InvalidImage
            | ErrorKind::ImageTooLarge => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Duplicate => 409,
            ErrorKind::RateLimited => 429,
            ErrorKind::OperationFailed => 502,
            ErrorKind::Internal => 500,
        }
    }

    /// ワイヤ上の `errorCode` トークンを取得
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::ValidationFailed.code(), "VALIDATION_FAILED");
    /// ```
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ErrorKind::InvalidImage => "INVALID_IMAGE",
            ErrorKind::ImageTooLarge => "IMAGE_TOO_LARGE",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::Forbidden => "FORBIDDEN",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Duplicate => "DUPLICATE",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::OperationFailed => "OPERATION_FAILED",
            ErrorKind::Internal => "INTERNAL",
        }
    }

    /// サーバー側のエラーかどうかを判定
    ///
    /// 5xx系のエラーは `true` を返します。
    /// これらのエラーはログに記録すべきです。
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }

    /// クライアント側のエラーかどうかを判定
    ///
    /// 4xx系のエラーは `true` を返します。
    #[inline]
    pub const fn is_client_error(&self) -> bool {
        let code = self.status_code();
        code >= 400 && code < 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
