use getset::Getters;
pub use url::{ParseError, Url};

/// Base address of a REST API. Paths are always resolved below the base,
/// even when the base itself carries a path prefix such as `/api`.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Endpoint {
    #[get = "pub"]
    base: Url,
}

impl Endpoint {
    pub fn parse(base: &str) -> Result<Self, ParseError> {
        let mut normalized = base.trim_end_matches('/').to_string();
        normalized.push('/');
        Ok(Self {
            base: Url::parse(&normalized)?,
        })
    }

    /// Build `<base>/<path>?k=v&...`. Parameters keep the order they are
    /// given in; no `?` is appended when there are none.
    pub fn url<K, V>(&self, path: &str, params: &[(K, V)]) -> Result<Url, ParseError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut url = self.base.join(path.trim_start_matches('/'))?;
        if !params.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(params.iter().map(|(k, v)| (k.as_ref(), v.as_ref())));
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_PARAMS: [(&str, &str); 0] = [];

    #[test]
    fn test_url_keeps_parameter_order() {
        let endpoint = Endpoint::parse("http://localhost:3000").unwrap();
        let url = endpoint
            .url(
                "lesson/getAll",
                &[("pageSize", "20"), ("type", "addition"), ("grade", "1")],
            )
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:3000/lesson/getAll?pageSize=20&type=addition&grade=1"
        );
    }

    #[test]
    fn test_url_without_params_has_no_query() {
        let endpoint = Endpoint::parse("http://localhost:3000/").unwrap();
        let url = endpoint.url("/lesson/abc", &NO_PARAMS).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/lesson/abc");
    }

    #[test]
    fn test_base_path_prefix_is_preserved() {
        let endpoint = Endpoint::parse("https://admin.example.org/api").unwrap();
        let url = endpoint.url("pupil/countAll", &NO_PARAMS).unwrap();
        assert_eq!(url.as_str(), "https://admin.example.org/api/pupil/countAll");
    }
}
