/// Either a node or a token; the element type of green and red children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    pub fn into_node(self) -> Option<N> {
        if let Self::Node(node) = self { Some(node) } else { None }
    }

    pub fn into_token(self) -> Option<T> {
        if let Self::Token(token) = self { Some(token) } else { None }
    }
}

/// Result of looking up the token at an offset: an offset on a token
/// boundary touches the tokens on both sides.
#[derive(Clone, Debug)]
pub enum TokenAtOffset<T> {
    None,
    Single(T),
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    /// The token starting at the offset when it sits on a boundary.
    pub fn right_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(token) | Self::Between(_, token) => Some(token),
        }
    }

    /// The token ending at the offset when it sits on a boundary.
    pub fn left_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(token) | Self::Between(token, _) => Some(token),
        }
    }
}
