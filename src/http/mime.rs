/// MIME type selected from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeType {
    Plain,
    Html,
    Css,
    Js,
    Jpeg,
    Png,
    Gif,
    Json,
    Pdf,
    Ttf,
    Ico,
    Svg,
    Webp,
    Csv,
}

impl MimeType {
    /// Maps an extension, with or without its leading dot. Unknown
    /// extensions are `text/plain`.
    pub fn from_extension(extension: &str) -> Self {
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        match extension {
            "htm" | "html" => MimeType::Html,
            "css" => MimeType::Css,
            "js" | "mjs" => MimeType::Js,
            "jpg" | "jpeg" => MimeType::Jpeg,
            "png" => MimeType::Png,
            "gif" => MimeType::Gif,
            "json" => MimeType::Json,
            "pdf" => MimeType::Pdf,
            "ttf" => MimeType::Ttf,
            "ico" => MimeType::Ico,
            "svg" => MimeType::Svg,
            "webp" => MimeType::Webp,
            "csv" => MimeType::Csv,
            _ => MimeType::Plain,
        }
    }

    /// Maps the extension of the final path segment.
    pub fn from_path(path: &str) -> Self {
        let file = path.rsplit('/').next().unwrap_or(path);
        match file.rsplit_once('.') {
            Some((_, extension)) => Self::from_extension(extension),
            None => MimeType::Plain,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MimeType::Plain => "text/plain",
            MimeType::Html => "text/html",
            MimeType::Css => "text/css",
            MimeType::Js => "application/javascript",
            MimeType::Jpeg => "image/jpeg",
            MimeType::Png => "image/png",
            MimeType::Gif => "image/gif",
            MimeType::Json => "application/json",
            MimeType::Pdf => "application/pdf",
            MimeType::Ttf => "font/ttf",
            MimeType::Ico => "image/x-icon",
            MimeType::Svg => "image/svg+xml",
            MimeType::Webp => "image/webp",
            MimeType::Csv => "text/csv",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map_to_their_type() {
        assert_eq!(MimeType::from_extension("html"), MimeType::Html);
        assert_eq!(MimeType::from_extension(".htm"), MimeType::Html);
        assert_eq!(MimeType::from_extension("mjs"), MimeType::Js);
        assert_eq!(MimeType::from_extension("jpeg"), MimeType::Jpeg);
        assert_eq!(MimeType::from_extension("ttf").as_str(), "font/ttf");
        assert_eq!(MimeType::from_extension("ico").as_str(), "image/x-icon");
    }

    #[test]
    fn unknown_extensions_fall_back_to_plain() {
        assert_eq!(MimeType::from_extension("exe"), MimeType::Plain);
        assert_eq!(MimeType::from_extension(""), MimeType::Plain);
    }

    #[test]
    fn path_lookup_uses_the_last_segment() {
        assert_eq!(MimeType::from_path("/static/app.v2.js"), MimeType::Js);
        assert_eq!(MimeType::from_path("/no.dot/file"), MimeType::Plain);
        assert_eq!(MimeType::from_path("index.html"), MimeType::Html);
    }
}
