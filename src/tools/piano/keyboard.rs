use std::collections::HashSet;

/// `KeyboardEvent.key` 문자열을 건반 표 조회용 문자로 바꾼다.
/// 한 글자짜리 키만 받고 소문자로 맞춘다 ("Shift", "Enter" 등은 None).
pub fn normalize_key(key: &str) -> Option<char> {
    let mut chars = key.chars();
    let ch = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some(ch.to_ascii_lowercase())
}

// 물리 키 코드 ("KeyQ", "Digit2") -> 건반 문자
fn code_to_key(code: &str) -> Option<char> {
    let rest = code
        .strip_prefix("Key")
        .or_else(|| code.strip_prefix("Digit"))?;
    normalize_key(rest)
}

/// keydown/keyup 이벤트가 가리키는 물리 키.
///
/// `key`는 Shift 등 조합 키에 따라 바뀌므로 ("2" -> "@") `code`를 먼저 본다.
/// 누를 때와 뗄 때 같은 문자가 나와야 눌림 상태가 풀린다.
/// `code`가 비어 있는 환경(가상 키보드 등)에서는 `key`를 쓴다.
pub fn physical_key(code: &str, key: &str) -> Option<char> {
    code_to_key(code).or_else(|| {
        if code.is_empty() {
            normalize_key(key)
        } else {
            None
        }
    })
}

/// 물리 키보드에서 눌려 있는 키 목록.
/// OS 키 반복으로 keydown이 계속 들어와도 같은 음을 다시 치지 않도록 한다.
#[derive(Debug, Default)]
pub struct PressedKeys {
    held: HashSet<char>,
}

impl PressedKeys {
    pub fn new() -> Self {
        Self::default()
    }

    // idle -> held. 이미 눌려 있으면 false
    pub fn press(&mut self, key: char) -> bool {
        self.held.insert(key)
    }

    // held -> idle. 눌려 있지 않았으면 false
    pub fn release(&mut self, key: char) -> bool {
        self.held.remove(&key)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("q"), Some('q'));
        assert_eq!(normalize_key("Q"), Some('q'));
        assert_eq!(normalize_key("2"), Some('2'));
        assert_eq!(normalize_key("Shift"), None);
        assert_eq!(normalize_key("ArrowLeft"), None);
        assert_eq!(normalize_key(""), None);
    }

    #[test]
    fn test_physical_key_uses_code() {
        assert_eq!(physical_key("KeyQ", "q"), Some('q'));
        assert_eq!(physical_key("KeyQ", "Q"), Some('q'));
        // Shift를 누른 채 떼면 key는 "@"지만 같은 키로 본다
        assert_eq!(physical_key("Digit2", "2"), Some('2'));
        assert_eq!(physical_key("Digit2", "@"), Some('2'));
        assert_eq!(physical_key("Digit0", ")"), Some('0'));
    }

    #[test]
    fn test_physical_key_other_codes() {
        assert_eq!(physical_key("ShiftLeft", "Shift"), None);
        assert_eq!(physical_key("Numpad2", "2"), None);
        assert_eq!(physical_key("Space", " "), None);
        assert_eq!(physical_key("KeyAB", "a"), None);
    }

    #[test]
    fn test_physical_key_without_code() {
        assert_eq!(physical_key("", "W"), Some('w'));
        assert_eq!(physical_key("", "Enter"), None);
    }

    #[test]
    fn test_repeat_is_suppressed() {
        let mut keys = PressedKeys::new();
        assert!(keys.press('q'));
        assert!(!keys.press('q'));
        assert!(!keys.press('q'));

        assert!(keys.release('q'));
        assert!(!keys.release('q'));
        assert!(keys.press('q'));
    }

    #[test]
    fn test_release_without_press() {
        let mut keys = PressedKeys::new();
        assert!(!keys.release('w'));
    }

    #[test]
    fn test_keys_are_independent() {
        let mut keys = PressedKeys::new();
        assert!(keys.press('q'));
        assert!(keys.press('2'));
        assert!(keys.release('q'));
        assert!(!keys.press('2'));

        keys.clear();
        assert!(keys.press('2'));
    }
}
