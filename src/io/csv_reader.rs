use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::{Stream, StreamExt};
use tokio::fs::File;
use tokio_util::compat::TokioAsyncReadCompatExt;

use super::error::IoError;
use super::parse::parse_record;
use crate::domain::TradeRecord;

/// Async stream of trade records from semicolon-delimited CSV input
///
/// The first row is treated as a header and never reaches the parser.
pub struct CsvTradeStream {
    inner: Pin<Box<dyn Stream<Item = Result<TradeRecord, IoError>> + Send>>,
}

impl CsvTradeStream {
    /// Create a new trade stream from an async reader
    pub fn new<R>(reader: R) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let csv_reader = AsyncReaderBuilder::new()
            .delimiter(b';')
            .has_headers(true)
            .flexible(true)
            .create_reader(reader);

        let stream = csv_reader.into_records().map(|result| {
            result
                .map_err(IoError::from)
                .and_then(|record| parse_record(&record).map_err(IoError::from))
        });

        Self {
            inner: Box::pin(stream),
        }
    }

    /// Create a new trade stream from a file path
    ///
    /// Opens the file asynchronously and handles the tokio-futures reader
    /// compatibility internally.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let file = File::open(path.as_ref()).await?;
        Ok(Self::new(file.compat()))
    }
}

impl Stream for CsvTradeStream {
    type Item = Result<TradeRecord, IoError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::error::ParseError;
    use futures::io::Cursor;
    use rust_decimal::Decimal;

    const HEADER: &str =
        "DataReferencia;CodigoInstrumento;AcaoAtualizacao;PrecoNegocio;QuantidadeNegociada;HoraFechamento;CodigoIdentificadorNegocio;TipoSessaoPregao;DataNegocio\n";

    fn stream_of(body: &str) -> CsvTradeStream {
        let data = format!("{HEADER}{body}");
        CsvTradeStream::new(Cursor::new(data.into_bytes()))
    }

    #[tokio::test]
    async fn reads_valid_rows_in_order() {
        let mut stream = stream_of(
            "2024-06-20;GOOG;0;29,00;11;100000;1;1;2024-06-20\n\
             2024-06-21;GOOG;0;31,00;5;100000;2;1;2024-06-21\n",
        );

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.instrument_code, "GOOG");
        assert_eq!(first.trade_price, Decimal::from(29));
        assert_eq!(first.trade_quantity, 11);

        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.trade_price, Decimal::from(31));
        assert_eq!(second.trade_quantity, 5);

        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn header_only_input_yields_nothing() {
        let mut stream = stream_of("");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn header_row_is_never_parsed() {
        // A header whose price column is garbage must not produce an error
        let data = "a;b;c;d;e;f;g;h;i\n2024-06-20;GOOG;0;29,00;11;100000;1;1;2024-06-20\n";
        let mut stream = CsvTradeStream::new(Cursor::new(data.as_bytes().to_vec()));

        let trade = stream.next().await.unwrap().unwrap();
        assert_eq!(trade.instrument_code, "GOOG");
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn surfaces_price_parse_error() {
        let mut stream = stream_of("2024-06-20;GOOG;0;1j,000;11;100000;1;1;2024-06-20\n");

        let result = stream.next().await.unwrap();
        assert!(matches!(
            result,
            Err(IoError::Parse(ParseError::InvalidPrice(_)))
        ));
    }

    #[tokio::test]
    async fn surfaces_date_parse_error() {
        let mut stream = stream_of("2024-06-20;GOOG;0;29,00;11;100000;1;1;junho\n");

        let result = stream.next().await.unwrap();
        assert!(matches!(
            result,
            Err(IoError::Parse(ParseError::InvalidDate(_)))
        ));
    }

    #[tokio::test]
    async fn reads_from_file() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            "{HEADER}2024-06-20;PETR4;0;40,25;7;170000;1;1;2024-06-20\n"
        )
        .unwrap();

        let mut stream = CsvTradeStream::from_file(file.path()).await.unwrap();
        let trade = stream.next().await.unwrap().unwrap();
        assert_eq!(trade.instrument_code, "PETR4");
        assert_eq!(trade.trade_price, Decimal::new(4025, 2));
        assert!(stream.next().await.is_none());
    }
}
