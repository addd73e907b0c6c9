//! Embedded internal procedure documents used to ground the assistant.
//!
//! The assistant is locked to this text plus the database catalog; it must
//! not answer from general knowledge.

pub const SYSTEM_INSTRUCTION: &str = "\
Bạn là trợ lý nội bộ về quy trình và biểu mẫu của Trường.
Bạn CHỈ được phép trả lời dựa trên \"TÀI LIỆU NỘI BỘ\" được cung cấp trong hội thoại.
TUYỆT ĐỐI KHÔNG dùng kiến thức chung hoặc suy đoán.
Nếu câu hỏi vượt ngoài tài liệu → trả lời đúng 1 câu: \"Chưa có thông tin trong tài liệu nội bộ đã cung cấp.\"

YÊU CẦU ĐỊNH DẠNG:
- Trả lời Markdown.
- Không viết 1 đoạn dài.
- Ưu tiên gạch đầu dòng.
- Khi trả lời về 1 bước: luôn có các mục: Chủ trì / Phối hợp / Kết quả / Thời hạn / Biểu mẫu (nếu tài liệu có).";

/// The exact sentence the model must return for out-of-scope questions.
pub const OUT_OF_SCOPE_REPLY: &str = "Chưa có thông tin trong tài liệu nội bộ đã cung cấp.";

/// Canned reply returned to the client when the upstream call fails.
pub const BUSY_REPLY: &str = "Xin lỗi, hệ thống AI đang bận. Bạn thử lại sau ít phút nhé!";

pub const INTERNAL_DOCS: &str = "\
QUY TRÌNH: THANH LÝ TÀI SẢN (QT_TLTS)

B1 — Đơn vị quản lý tài sản lập giấy đề nghị
- Nội dung công việc: Đơn vị trực tiếp quản lý, sử dụng xác định không có nhu cầu sử dụng tài sản hoặc có tần suất sử dụng thấp, khai thác không hiệu quả.
- Chủ trì: Trưởng đơn vị có tài sản/nhu cầu
- Phối hợp: P.TCHC-QT
- Kết quả: Giấy đề nghị
- Thời hạn: -
- Biểu mẫu: Giấy đề nghị thanh lý tài sản (Link:https://files.example.edu.vn/forms/Giaydenghithanhlytaisan.docx )

B2 — Tổng hợp danh sách tài sản cần thanh lý
- Nội dung công việc: Trưởng phòng TCHC-QT kiểm tra, đối chiếu hồ sơ và xác định tài sản theo yêu cầu của đơn vị.
- Chủ trì: Trưởng P.TCHC-QT
- Phối hợp: P.Tài chính + đơn vị liên quan
- Kết quả: Giấy đề nghị đã xem xét
- Thời hạn: 3 ngày
- Biểu mẫu: -

B3 — Kiểm tra, đánh giá hiện trạng
- Nội dung công việc: Kiểm tra xác nhận tình trạng, kiến nghị hướng xử lý đúng theo quy định tài chính.
- Chủ trì: Trưởng P.Tài chính
- Phối hợp: Trưởng P.TCHC-QT
- Kết quả: Biên bản hiện trạng
- Thời hạn: 2 ngày
- Biểu mẫu: Biên bản kiểm tra hiện trạng (Link:https://files.example.edu.vn/forms/Bienbankiemtrahientrang.docx )

B4 — Xét duyệt yêu cầu, danh mục đề xuất
- Nội dung công việc: Tổng hợp đề xuất; căn cứ biên bản kiểm kê/hiện trạng; lập danh mục tài sản cần thu hồi; lập kế hoạch thanh lý; tham mưu thành lập Hội đồng TLTS.
- Chủ trì: Trưởng P.Tài chính / Trưởng P.TCHC-QT (tùy nội dung)
- Phối hợp: Đơn vị có tài sản cần thu hồi
- Kết quả: Danh mục tài sản cần thu hồi; Kế hoạch thanh lý; Quyết định thành lập Hội đồng TLTS
- Thời hạn: 2 ngày
- Biểu mẫu: Giấy đề nghị thu hồi tài sản (Link:https://files.example.edu.vn/forms/Giaydenghithuhoitaisan.docx )

B5 — Duyệt
- Nội dung công việc: Hiệu trưởng phê duyệt và phân công đơn vị thực hiện quá trình thanh lý tài sản.
- Chủ trì: Hiệu trưởng
- Phối hợp: Trưởng các đơn vị, Trưởng phòng chức năng có liên quan
- Kết quả: Quyết định phê duyệt
- Thời hạn: 1 ngày
- Biểu mẫu: -

QUY TRÌNH: KIỂM KÊ TÀI SẢN (QT_KKTS)

B1 — Lập kế hoạch kiểm kê
- Nội dung công việc: P.TCHC-QT lập kế hoạch kiểm kê định kỳ cuối năm hoặc đột xuất theo yêu cầu.
- Chủ trì: Trưởng P.TCHC-QT
- Phối hợp: P.Tài chính
- Kết quả: Kế hoạch kiểm kê
- Thời hạn: 3 ngày
- Biểu mẫu: Kế hoạch kiểm kê tài sản (Link:https://files.example.edu.vn/forms/Kehoachkiemketaisan.docx )

B2 — Tổ chức kiểm kê thực tế
- Nội dung công việc: Hội đồng kiểm kê đối chiếu sổ sách với hiện trạng tài sản tại từng đơn vị.
- Chủ trì: Hội đồng kiểm kê
- Phối hợp: Đơn vị quản lý tài sản
- Kết quả: Biên bản kiểm kê tài sản
- Thời hạn: 5 ngày
- Biểu mẫu: Biên bản kiểm kê tài sản (Link:https://files.example.edu.vn/forms/Bienbankiemketaisan.docx )

B3 — Tổng hợp, báo cáo kết quả
- Nội dung công việc: Tổng hợp kết quả kiểm kê, đề xuất xử lý chênh lệch, trình Ban Giám hiệu.
- Chủ trì: Trưởng P.Tài chính
- Phối hợp: Trưởng P.TCHC-QT
- Kết quả: Báo cáo kết quả kiểm kê
- Thời hạn: 2 ngày
- Biểu mẫu: -

QUY TRÌNH: MUA SẮM HÀNG HÓA, DỊCH VỤ (QT_MSHH)

B1 — Đơn vị lập đề nghị mua sắm
- Nội dung công việc: Đơn vị có nhu cầu lập giấy đề nghị mua sắm hàng hóa, dịch vụ kèm dự toán.
- Chủ trì: Trưởng đơn vị có yêu cầu
- Phối hợp: P.TCHC-QT
- Kết quả: Giấy đề nghị mua sắm
- Thời hạn: -
- Biểu mẫu: Giấy đề nghị mua sắm (Link:https://files.example.edu.vn/forms/Giaydenghimuasam.docx )

B2 — Thẩm định, phê duyệt dự toán
- Nội dung công việc: P.Tài chính thẩm định dự toán; trình Ban Giám hiệu phê duyệt chủ trương mua sắm.
- Chủ trì: Trưởng P.Tài chính
- Phối hợp: P.TCHC-QT
- Kết quả: Dự toán được phê duyệt
- Thời hạn: 3 ngày
- Biểu mẫu: -

B3 — Tổ chức mua sắm, ký hợp đồng
- Nội dung công việc: Tổ chức lựa chọn nhà cung cấp theo quy định; ký kết hợp đồng.
- Chủ trì: Trưởng P.TCHC-QT
- Phối hợp: Tổ chuyên gia; Ban Giám hiệu
- Kết quả: Hợp đồng được ký kết
- Thời hạn: 5 ngày
- Biểu mẫu: -

B4 — Nghiệm thu, bàn giao, thanh toán
- Nội dung công việc: Nghiệm thu khối lượng, bàn giao hàng hóa cho đơn vị sử dụng, lập hồ sơ thanh toán.
- Chủ trì: Trưởng P.TCHC-QT
- Phối hợp: Trưởng P.Tài chính; Đơn vị có yêu cầu
- Kết quả: Biên bản nghiệm thu; Bộ chứng từ thanh toán
- Thời hạn: 2 ngày
- Biểu mẫu: -";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_mandates_the_exact_fallback_sentence() {
        assert!(SYSTEM_INSTRUCTION.contains(OUT_OF_SCOPE_REPLY));
    }

    #[test]
    fn documents_cover_all_three_procedures() {
        for code in ["QT_TLTS", "QT_KKTS", "QT_MSHH"] {
            assert!(INTERNAL_DOCS.contains(code), "missing {code}");
        }
    }

    #[test]
    fn document_links_use_the_rewritable_marker() {
        assert!(INTERNAL_DOCS.contains("(Link:https://"));
    }
}
